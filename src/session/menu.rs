//! Menu command literals, one set per session state
//!
//! Commands are short numeric strings scoped to the active menu. Anything
//! else is an invalid option and leaves the state unchanged.

/// Commands available before login
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreLoginCommand {
    Register,
    Login,
    Exit,
}

impl PreLoginCommand {
    pub const MENU: &'static str = "Main menu - [1] Register  [2] Login  [3] Exit - Enter choice:";

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(PreLoginCommand::Register),
            "2" => Some(PreLoginCommand::Login),
            "3" => Some(PreLoginCommand::Exit),
            _ => None,
        }
    }
}

/// Commands available to a logged-in student
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentCommand {
    CreateBorrowRequest,
    ViewMyRecords,
    UpdatePassword,
    Logout,
    Exit,
}

impl StudentCommand {
    pub const MENU: &'static str = "Student menu - [1] Create borrow request  [2] View my records  [3] Update password  [4] Logout  [5] Exit - Enter choice:";

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(StudentCommand::CreateBorrowRequest),
            "2" => Some(StudentCommand::ViewMyRecords),
            "3" => Some(StudentCommand::UpdatePassword),
            "4" => Some(StudentCommand::Logout),
            "5" => Some(StudentCommand::Exit),
            _ => None,
        }
    }
}

/// Commands available to a logged-in librarian
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibrarianCommand {
    AddBookEntry,
    ViewAllRecords,
    AssignBorrowRequest,
    ViewAssignedToMe,
    MarkReturned,
    UpdatePassword,
    Logout,
    Exit,
}

impl LibrarianCommand {
    pub const MENU: &'static str = "Librarian menu - [1] Add book entry  [2] View all records  [3] Assign borrow request  [4] View my assigned records  [5] Mark record returned  [6] Update password  [7] Logout  [8] Exit - Enter choice:";

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(LibrarianCommand::AddBookEntry),
            "2" => Some(LibrarianCommand::ViewAllRecords),
            "3" => Some(LibrarianCommand::AssignBorrowRequest),
            "4" => Some(LibrarianCommand::ViewAssignedToMe),
            "5" => Some(LibrarianCommand::MarkReturned),
            "6" => Some(LibrarianCommand::UpdatePassword),
            "7" => Some(LibrarianCommand::Logout),
            "8" => Some(LibrarianCommand::Exit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_are_scoped_per_menu() {
        assert_eq!(PreLoginCommand::parse("1"), Some(PreLoginCommand::Register));
        assert_eq!(PreLoginCommand::parse("4"), None);

        assert_eq!(
            StudentCommand::parse("1"),
            Some(StudentCommand::CreateBorrowRequest)
        );
        assert_eq!(StudentCommand::parse("8"), None);

        assert_eq!(
            LibrarianCommand::parse("8"),
            Some(LibrarianCommand::Exit)
        );
        assert_eq!(LibrarianCommand::parse("9"), None);
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert_eq!(PreLoginCommand::parse(" 2 "), Some(PreLoginCommand::Login));
        assert_eq!(PreLoginCommand::parse("register"), None);
    }

    #[test]
    fn menus_are_prompts() {
        assert!(super::super::wire::is_prompt(PreLoginCommand::MENU));
        assert!(super::super::wire::is_prompt(StudentCommand::MENU));
        assert!(super::super::wire::is_prompt(LibrarianCommand::MENU));
    }
}
