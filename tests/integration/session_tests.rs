//! End-to-end session tests: a real listener, real sockets, real snapshots

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::time::timeout;

use libris_server::config::{AppConfig, LoggingConfig, ServerConfig, StorageConfig};
use libris_server::persistence::SnapshotStore;
use libris_server::repository::Repository;
use libris_server::server::Server;
use libris_server::services::Services;
use libris_server::AppState;

const READ_TIMEOUT: Duration = Duration::from_secs(5);

struct TestServer {
    addr: std::net::SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<libris_server::AppResult<()>>,
    repository: Arc<Repository>,
    store: Arc<SnapshotStore>,
}

impl TestServer {
    async fn start(data_dir: &Path) -> Self {
        let store = Arc::new(SnapshotStore::open(data_dir).await.expect("open store"));
        let (users, records) = store.load().await;
        let repository = Arc::new(Repository::with_data(users, records));
        let services = Arc::new(Services::new(
            Arc::clone(&repository),
            Arc::clone(&store),
        ));

        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            storage: StorageConfig {
                data_dir: data_dir.to_path_buf(),
            },
            logging: LoggingConfig::default(),
        };
        let state = AppState {
            config: Arc::new(config),
            services,
        };

        let server = Server::bind(&state).await.expect("bind server");
        let addr = server.local_addr().expect("local addr");
        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(server.run_until(async {
            let _ = shutdown_rx.await;
        }));

        TestServer {
            addr,
            shutdown,
            handle,
            repository,
            store,
        }
    }

    /// Stop accepting and flush the final snapshot, like process shutdown
    async fn stop(self) {
        let _ = self.shutdown.send(());
        self.handle.await.expect("join listener").expect("listener result");
        let snapshot = self.repository.snapshot();
        self.store.persist(&snapshot).await.expect("final flush");
    }
}

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect");
        let (reader, writer) = stream.into_split();
        Client {
            reader: BufReader::new(reader),
            writer,
        }
    }

    async fn next_message(&mut self) -> String {
        let mut line = String::new();
        let bytes = timeout(READ_TIMEOUT, self.reader.read_line(&mut line))
            .await
            .expect("timed out waiting for server message")
            .expect("read message");
        assert!(bytes > 0, "server closed the connection unexpectedly");
        line.trim_end().to_string()
    }

    /// Read until the next prompt (a message ending in ':'), then reply
    async fn answer_next_prompt(&mut self, reply: &str) -> String {
        loop {
            let message = self.next_message().await;
            if message.ends_with(':') {
                self.writer
                    .write_all(format!("{}\n", reply).as_bytes())
                    .await
                    .expect("send reply");
                return message;
            }
        }
    }

    /// Read informational messages until one contains `needle`
    async fn expect_containing(&mut self, needle: &str) -> String {
        loop {
            let message = self.next_message().await;
            if message.contains(needle) {
                return message;
            }
            assert!(
                !message.ends_with(':'),
                "unexpected prompt while waiting for '{}': {}",
                needle,
                message
            );
        }
    }

    /// Drive the guided registration flow from the pre-login menu
    async fn register(&mut self, name: &str, id: &str, email: &str, role: &str) {
        self.answer_next_prompt("1").await;
        self.answer_next_prompt(name).await;
        self.answer_next_prompt(id).await;
        self.answer_next_prompt(email).await;
        self.answer_next_prompt("p1").await;
        self.answer_next_prompt("CS").await;
        self.answer_next_prompt(role).await;
    }

    async fn login(&mut self, email: &str, password: &str) {
        self.answer_next_prompt("2").await;
        self.answer_next_prompt(email).await;
        self.answer_next_prompt(password).await;
    }
}

/// Pull the record id out of "Borrow request BR-… created with status …"
fn record_id_from(message: &str) -> String {
    message
        .split_whitespace()
        .nth(2)
        .expect("record id in message")
        .to_string()
}

#[tokio::test]
async fn registration_enforces_unique_ids() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start(dir.path()).await;

    let mut client = Client::connect(server.addr).await;
    client.expect_containing("Welcome").await;

    client.register("Ann", "G001", "ann@x.com", "1").await;
    client.expect_containing("Registration successful").await;

    // Same id, different email
    client.register("Ann", "G001", "ann2@x.com", "1").await;
    let error = client.expect_containing("already exists").await;
    assert!(error.contains("G001"));
    assert_eq!(server.repository.user_count(), 1);

    server.stop().await;
}

#[tokio::test]
async fn login_matches_email_case_insensitively_and_password_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start(dir.path()).await;

    let mut client = Client::connect(server.addr).await;
    client.expect_containing("Welcome").await;
    client.register("Ann", "G001", "ann@x.com", "1").await;
    client.expect_containing("Registration successful").await;

    client.login("ann@x.com", "wrong").await;
    client.expect_containing("Invalid email or password").await;

    client.login("ANN@X.COM", "p1").await;
    client.expect_containing("Welcome, Ann").await;

    server.stop().await;
}

#[tokio::test]
async fn librarian_catalogues_a_book() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start(dir.path()).await;

    let mut client = Client::connect(server.addr).await;
    client.expect_containing("Welcome").await;
    client.register("Lia", "LIB001", "lia@x.com", "2").await;
    client.expect_containing("Registration successful").await;
    client.login("lia@x.com", "p1").await;
    client.expect_containing("Librarian").await;

    // Add a book entry
    client.answer_next_prompt("1").await;
    client.answer_next_prompt("Title").await;
    client.answer_next_prompt("Author").await;
    client.answer_next_prompt("ISBN123").await;
    client.expect_containing("Book entry").await;
    let summary = client.expect_containing("NEW_BOOK_ENTRY").await;
    assert!(summary.contains("AVAILABLE"));
    assert!(summary.contains("assignee LIB001"));
    assert!(summary.contains("ISBN123"));

    server.stop().await;
}

#[tokio::test]
async fn borrow_request_lifecycle_with_assignment() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start(dir.path()).await;

    // Student opens two borrow requests
    let mut student = Client::connect(server.addr).await;
    student.expect_containing("Welcome").await;
    student.register("Ann", "G001", "ann@x.com", "1").await;
    student.expect_containing("Registration successful").await;
    student.login("ann@x.com", "p1").await;
    student.expect_containing("Student").await;

    student.answer_next_prompt("1").await;
    let created = student.expect_containing("Borrow request").await;
    assert!(created.contains("REQUESTED"));
    let first_id = record_id_from(&created);

    student.answer_next_prompt("1").await;
    student.expect_containing("Borrow request").await;

    // "My records" lists exactly the student's two requests
    student.answer_next_prompt("2").await;
    student.expect_containing("Your records - 2 record(s)").await;

    // Librarian claims the first request
    let mut librarian = Client::connect(server.addr).await;
    librarian.expect_containing("Welcome").await;
    librarian.register("Lia", "LIB001", "lia@x.com", "2").await;
    librarian.expect_containing("Registration successful").await;
    librarian.login("lia@x.com", "p1").await;
    librarian.expect_containing("Librarian").await;

    librarian.answer_next_prompt("3").await;
    librarian.expect_containing("Pending borrow requests").await;
    librarian.answer_next_prompt(&first_id).await;
    let assigned = librarian.expect_containing("BORROWED").await;
    assert!(assigned.contains("LIB001"));

    // A second attempt on the same record reports AlreadyProcessed
    librarian.answer_next_prompt("3").await;
    librarian.expect_containing("Pending borrow requests").await;
    librarian.answer_next_prompt(&first_id).await;
    librarian.expect_containing("already been processed").await;

    // The record is unchanged
    let record = server.repository.find_record(&first_id).unwrap();
    assert_eq!(record.assigned_librarian_id, "LIB001");

    // "Assigned to me" shows exactly the claimed request
    librarian.answer_next_prompt("4").await;
    librarian
        .expect_containing("Records assigned to you - 1 record(s)")
        .await;

    // Mark it returned, twice
    librarian.answer_next_prompt("5").await;
    librarian.answer_next_prompt(&first_id).await;
    librarian.expect_containing("RETURNED").await;
    librarian.answer_next_prompt("5").await;
    librarian.answer_next_prompt(&first_id).await;
    librarian.expect_containing("already been processed").await;

    server.stop().await;
}

#[tokio::test]
async fn state_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();

    let server = TestServer::start(dir.path()).await;
    let mut client = Client::connect(server.addr).await;
    client.expect_containing("Welcome").await;
    client.register("Ann", "G001", "ann@x.com", "1").await;
    client.expect_containing("Registration successful").await;
    client.login("ann@x.com", "p1").await;
    client.expect_containing("Student").await;
    client.answer_next_prompt("1").await;
    let created = client.expect_containing("Borrow request").await;
    let record_id = record_id_from(&created);
    drop(client);
    server.stop().await;

    // A fresh process over the same data directory sees everything
    let server = TestServer::start(dir.path()).await;
    assert_eq!(server.repository.user_count(), 1);
    let record = server.repository.find_record(&record_id).unwrap();
    assert_eq!(record.creator_id, "G001");

    let mut client = Client::connect(server.addr).await;
    client.expect_containing("Welcome").await;
    client.login("ann@x.com", "p1").await;
    client.expect_containing("Welcome, Ann").await;
    client.answer_next_prompt("2").await;
    client.expect_containing("Your records - 1 record(s)").await;

    server.stop().await;
}

#[tokio::test]
async fn a_silent_client_does_not_stall_other_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start(dir.path()).await;

    // This client reads its welcome and then never answers its prompt
    let mut idle = Client::connect(server.addr).await;
    idle.expect_containing("Welcome").await;

    // A second client completes a full conversation meanwhile
    let mut active = Client::connect(server.addr).await;
    active.expect_containing("Welcome").await;
    active.register("Ann", "G001", "ann@x.com", "1").await;
    active.expect_containing("Registration successful").await;
    active.answer_next_prompt("3").await;
    active.expect_containing("Goodbye").await;

    drop(idle);
    server.stop().await;
}
