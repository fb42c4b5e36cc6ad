//! End-to-end tests of the production Runtime against the simulated server.
//!
//! Every client is a real [`Runtime`] with a [`SimDriver`] and a
//! [`RecordingView`]; only the sockets are simulated. Single-client tests use
//! [`Runtime::run`] with a script, multi-client tests interleave clients by
//! hand with [`settle`].

use parlor_app::{Input, Intent, Phase, Runtime, SessionConfig};
use parlor_harness::{
    InvariantRegistry, RecordingView, SessionSnapshot, SharedSimServer, SimDriver,
    create_shared_server, settle,
};
use parlor_proto::Schema;

type Client = Runtime<SimDriver, RecordingView>;

fn config(schema: Schema) -> SessionConfig {
    SessionConfig { schema, ..SessionConfig::default() }
}

fn client(server: &SharedSimServer, schema: Schema) -> Client {
    Runtime::new(SimDriver::new(server.clone()), RecordingView::new(), config(schema))
}

/// Feed one intent, then everything the server answers.
async fn act(client: &mut Client, intent: Intent) {
    client.process(Input::Intent(intent)).await.unwrap();
    settle(client).await.unwrap();
}

fn assert_invariants(client: &Client) {
    let snapshot = SessionSnapshot::capture(client.session(), client.view());
    if let Err(violations) = InvariantRegistry::standard().check_all(&snapshot) {
        panic!("invariants violated: {violations:?}");
    }
}

fn connect(name: &str) -> Intent {
    Intent::Connect { name: name.into() }
}

fn join(room: &str) -> Intent {
    Intent::JoinRoom { room: room.into() }
}

fn say(text: &str) -> Intent {
    Intent::SendMessage { text: text.into() }
}

#[tokio::test]
async fn terse_script_runs_to_completion() {
    let server = create_shared_server(Schema::Terse);
    let driver = SimDriver::new(server.clone()).with_script([
        connect("alice"),
        join("lobby"),
        say("hello"),
        Intent::Quit,
    ]);
    let mut runtime = Runtime::new(driver, RecordingView::new(), config(Schema::Terse));

    runtime.run().await.unwrap();

    assert_eq!(runtime.driver().transmitted(), [
        r#"{"type":"connect","username":"alice"}"#,
        r#"{"type":"list_rooms"}"#,
        r#"{"type":"join","room":"lobby"}"#,
        r#"{"type":"list_rooms"}"#,
        r#"{"type":"message","message":"hello"}"#,
    ]);

    let view = runtime.view();
    assert_eq!(view.system(), ["joined lobby", "alice se unió a la sala."]);
    assert_eq!(view.chat(), ["alice: hello"]);
    assert_eq!(view.room_names(), ["lobby"]);
    assert_eq!(view.active_room.as_deref(), Some("lobby"));
    assert_eq!(view.occupants, ["alice"]);
    assert!(view.alerts.is_empty());
    assert_invariants(&runtime);

    // Quitting hangs up
    assert!(runtime.driver().client_id().is_none());
    assert!(server.lock().unwrap().members("lobby").is_empty());
}

#[tokio::test]
async fn verbose_script_runs_to_completion() {
    let server = create_shared_server(Schema::Verbose);
    let driver = SimDriver::new(server.clone()).with_script([
        connect("alice"),
        Intent::CreateRoom { room: "den".into() },
        say("hola"),
        Intent::Quit,
    ]);
    let mut runtime = Runtime::new(driver, RecordingView::new(), config(Schema::Verbose));

    runtime.run().await.unwrap();

    assert_eq!(runtime.driver().transmitted(), [
        r#"{"tipo":"conectar","nombre":"alice"}"#,
        r#"{"tipo":"obtener_salas"}"#,
        r#"{"tipo":"crear_sala","nombre_sala":"den"}"#,
        r#"{"tipo":"obtener_salas"}"#,
        r#"{"tipo":"mensaje","contenido":"hola"}"#,
    ]);

    let view = runtime.view();
    assert_eq!(view.chat(), ["alice: hola"]);
    assert_eq!(view.room_names(), ["den"]);
    assert_eq!(view.directory[0].occupants, Some(1));
    assert_eq!(view.active_room.as_deref(), Some("den"));
    assert_eq!(view.occupants, ["alice"]);
    assert_invariants(&runtime);
}

#[tokio::test]
async fn greeting_is_shown_before_any_room() {
    let server = create_shared_server(Schema::Terse);
    let mut alice = client(&server, Schema::Terse);

    act(&mut alice, connect("alice")).await;

    assert_eq!(alice.session().phase(), Phase::Identified);
    assert_eq!(alice.view().system(), [
        "connecting to ws://localhost:8765 as alice",
        "Bienvenido, alice",
    ]);
    assert_invariants(&alice);
}

#[tokio::test]
async fn terse_clients_chat_in_a_shared_room() {
    let server = create_shared_server(Schema::Terse);
    let mut alice = client(&server, Schema::Terse);
    let mut bob = client(&server, Schema::Terse);

    act(&mut alice, connect("alice")).await;
    act(&mut alice, join("lobby")).await;
    act(&mut bob, connect("bob")).await;
    act(&mut bob, join("lobby")).await;
    settle(&mut alice).await.unwrap();

    act(&mut bob, say("hi")).await;
    settle(&mut alice).await.unwrap();

    assert_eq!(alice.view().chat(), ["bob: hi"]);
    assert!(alice.view().system().contains(&"bob se unió a la sala."));
    assert_eq!(alice.view().occupants, ["alice", "bob"]);
    assert_eq!(bob.view().chat(), ["bob: hi"]);
    assert!(bob.view().screen.iter().any(|line| matches!(
        line,
        parlor_harness::ScreenLine::Chat(chat) if chat.is_self
    )));
    assert_invariants(&alice);
    assert_invariants(&bob);
}

#[tokio::test]
async fn verbose_clients_see_presence() {
    let server = create_shared_server(Schema::Verbose);
    let mut alice = client(&server, Schema::Verbose);
    let mut bob = client(&server, Schema::Verbose);

    act(&mut alice, connect("alice")).await;
    act(&mut alice, Intent::CreateRoom { room: "den".into() }).await;
    act(&mut bob, connect("bob")).await;
    act(&mut bob, join("den")).await;
    settle(&mut alice).await.unwrap();

    assert_eq!(alice.view().system(), ["joined den", "bob joined the room"]);
    assert_eq!(alice.view().occupants, ["alice", "bob"]);
    assert_eq!(bob.session().membership(), Some("den"));
    assert_eq!(bob.view().occupants, ["alice", "bob"]);

    act(&mut bob, join("attic")).await;
    settle(&mut alice).await.unwrap();

    assert_eq!(alice.view().system().last(), Some(&"bob left the room"));
    assert_eq!(alice.view().room_names(), ["den", "attic"]);
    assert_invariants(&alice);
    assert_invariants(&bob);
}

#[tokio::test]
async fn verbose_room_creation_conflict_is_alerted() {
    let server = create_shared_server(Schema::Verbose);
    let mut alice = client(&server, Schema::Verbose);
    let mut bob = client(&server, Schema::Verbose);

    act(&mut alice, connect("alice")).await;
    act(&mut alice, Intent::CreateRoom { room: "den".into() }).await;
    act(&mut bob, connect("bob")).await;
    act(&mut bob, Intent::CreateRoom { room: "den".into() }).await;

    assert_eq!(bob.view().alerts, ["La sala ya existe"]);
    assert_eq!(bob.session().membership(), None);
    assert_invariants(&bob);
}

#[tokio::test]
async fn optimistic_create_conflict_returns_to_previous_room() {
    let server = create_shared_server(Schema::Verbose);
    let mut alice = client(&server, Schema::Verbose);
    let config = SessionConfig { optimistic_join: true, ..config(Schema::Verbose) };
    let mut bob = Runtime::new(SimDriver::new(server.clone()), RecordingView::new(), config);

    act(&mut alice, connect("alice")).await;
    act(&mut alice, Intent::CreateRoom { room: "den".into() }).await;
    act(&mut bob, connect("bob")).await;
    act(&mut bob, join("attic")).await;

    bob.process(Input::Intent(Intent::CreateRoom { room: "den".into() })).await.unwrap();
    assert_eq!(bob.session().membership(), Some("den"));

    settle(&mut bob).await.unwrap();
    assert_eq!(bob.view().alerts, ["La sala ya existe"]);
    assert_eq!(bob.session().membership(), Some("attic"));
    assert_eq!(bob.session().pending_join(), None);
    assert_eq!(bob.view().active_room.as_deref(), Some("attic"));
    assert_eq!(bob.view().system(), ["back in attic"]);
    assert_eq!(server.lock().unwrap().members("attic"), ["bob"]);
    assert_invariants(&bob);

    act(&mut bob, say("still here")).await;
    assert_eq!(bob.view().chat(), ["bob: still here"]);
}

#[tokio::test]
async fn terse_join_follows_the_server_room_name() {
    let server = create_shared_server(Schema::Terse);
    let mut alice = client(&server, Schema::Terse);

    act(&mut alice, connect("alice")).await;
    act(&mut alice, join("my room!")).await;

    assert_eq!(server.lock().unwrap().members("my room"), ["alice"]);
    assert_eq!(alice.session().membership(), Some("my room"));
    assert_eq!(alice.session().pending_join(), None);
    assert_eq!(alice.view().active_room.as_deref(), Some("my room"));

    act(&mut alice, say("hi")).await;
    assert_eq!(alice.view().chat(), ["alice: hi"]);
    assert_invariants(&alice);
}

#[tokio::test]
async fn terse_optimistic_join_follows_the_server_room_name() {
    let server = create_shared_server(Schema::Terse);
    let config = SessionConfig { optimistic_join: true, ..config(Schema::Terse) };
    let mut alice = Runtime::new(SimDriver::new(server.clone()), RecordingView::new(), config);

    act(&mut alice, connect("alice")).await;
    act(&mut alice, join("lobby")).await;
    act(&mut alice, join("den?!")).await;

    assert_eq!(alice.session().membership(), Some("den"));
    assert_eq!(alice.view().system(), ["joined den", "alice se unió a la sala."]);
    assert_eq!(alice.view().occupants, ["alice"]);
    assert_invariants(&alice);
}

#[tokio::test]
async fn rooms_are_isolated() {
    let server = create_shared_server(Schema::Terse);
    let mut alice = client(&server, Schema::Terse);
    let mut bob = client(&server, Schema::Terse);

    act(&mut alice, connect("alice")).await;
    act(&mut alice, join("lobby")).await;
    act(&mut bob, connect("bob")).await;
    act(&mut bob, join("den")).await;

    act(&mut bob, say("psst")).await;
    settle(&mut alice).await.unwrap();
    assert!(alice.view().chat().is_empty());

    // A misrouted frame tagged for another room is still filtered
    alice.driver_mut().inject_text(r#"{"type":"message","room":"den","sender":"bob","message":"psst"}"#);
    alice.driver_mut().inject_text(r#"{"type":"message","room":"lobby","sender":"bob","message":"hey"}"#);
    settle(&mut alice).await.unwrap();

    assert_eq!(alice.view().chat(), ["bob: hey"]);
    assert_invariants(&alice);
}

#[tokio::test]
async fn garbage_frames_leave_state_untouched() {
    let server = create_shared_server(Schema::Terse);
    let mut alice = client(&server, Schema::Terse);
    act(&mut alice, connect("alice")).await;
    act(&mut alice, join("lobby")).await;
    let updates_before = alice.view().updates.len();

    alice.driver_mut().inject_text("not json");
    alice.driver_mut().inject_text(r#"{"type":"typing","sender":"bob"}"#);
    alice.driver_mut().inject_text(r#"{"room":"lobby"}"#);
    alice.driver_mut().inject_text(r#"{"type":"message","room":"lobby"}"#);
    settle(&mut alice).await.unwrap();

    assert_eq!(alice.view().updates.len(), updates_before);
    assert_eq!(alice.session().membership(), Some("lobby"));
    assert_eq!(alice.session().phase(), Phase::Identified);
}

#[tokio::test]
async fn terse_leave_notifies_the_room() {
    let server = create_shared_server(Schema::Terse);
    let mut alice = client(&server, Schema::Terse);
    let mut bob = client(&server, Schema::Terse);

    act(&mut alice, connect("alice")).await;
    act(&mut alice, join("lobby")).await;
    act(&mut bob, connect("bob")).await;
    act(&mut bob, join("lobby")).await;

    act(&mut alice, Intent::LeaveRoom).await;
    settle(&mut bob).await.unwrap();

    assert_eq!(alice.session().membership(), None);
    assert_eq!(alice.view().active_room, None);
    assert_eq!(alice.view().system(), ["left lobby"]);
    assert_eq!(bob.view().system().last(), Some(&"alice salió de la sala."));
    assert_eq!(bob.view().occupants, ["bob"]);
    assert_invariants(&alice);
    assert_invariants(&bob);
}

#[tokio::test]
async fn verbose_leave_is_dropped() {
    let server = create_shared_server(Schema::Verbose);
    let mut alice = client(&server, Schema::Verbose);
    act(&mut alice, connect("alice")).await;
    act(&mut alice, join("den")).await;
    let sent = alice.driver().transmitted().len();

    act(&mut alice, Intent::LeaveRoom).await;

    assert_eq!(alice.driver().transmitted().len(), sent);
    assert_eq!(alice.session().membership(), Some("den"));
}

#[tokio::test]
async fn refused_connection_ends_the_session() {
    let server = create_shared_server(Schema::Terse);
    let driver = SimDriver::new(server).refusing_connections();
    let mut alice = Runtime::new(driver, RecordingView::new(), config(Schema::Terse));

    act(&mut alice, connect("alice")).await;

    assert_eq!(alice.view().alerts, [
        "connection error: connection refused",
        "disconnected from server",
    ]);
    assert_eq!(alice.session().phase(), Phase::Ended);

    act(&mut alice, join("lobby")).await;
    assert!(alice.driver().transmitted().is_empty());
}

#[tokio::test]
async fn reconnect_after_server_drop_starts_fresh() {
    let server = create_shared_server(Schema::Terse);
    let mut alice = client(&server, Schema::Terse);
    act(&mut alice, connect("alice")).await;
    act(&mut alice, join("lobby")).await;

    alice.driver_mut().drop_connection(Some("server restart"));
    settle(&mut alice).await.unwrap();

    assert_eq!(alice.view().alerts, ["disconnected from server: server restart"]);
    assert_eq!(alice.session().phase(), Phase::Ended);
    assert!(server.lock().unwrap().members("lobby").is_empty());

    act(&mut alice, connect("alice")).await;

    assert_eq!(alice.session().phase(), Phase::Identified);
    assert_eq!(alice.session().membership(), None);
    assert_eq!(alice.view().active_room, None);
    assert!(alice.view().occupants.is_empty());
    assert_eq!(alice.view().system(), [
        "connecting to ws://localhost:8765 as alice",
        "Bienvenido, alice",
    ]);
    // Terse rooms outlive their members
    assert_eq!(alice.view().room_names(), ["lobby"]);
    assert_invariants(&alice);
}

#[tokio::test]
async fn optimistic_join_renders_before_confirmation() {
    let server = create_shared_server(Schema::Terse);
    let config = SessionConfig { optimistic_join: true, ..config(Schema::Terse) };
    let mut alice = Runtime::new(SimDriver::new(server.clone()), RecordingView::new(), config);
    act(&mut alice, connect("alice")).await;

    alice.process(Input::Intent(join("lobby"))).await.unwrap();
    assert_eq!(alice.session().membership(), Some("lobby"));
    assert_eq!(alice.view().active_room.as_deref(), Some("lobby"));

    settle(&mut alice).await.unwrap();
    assert_eq!(alice.view().clears(), 1);
    assert_eq!(alice.view().system(), ["joined lobby", "alice se unió a la sala."]);
    assert_eq!(alice.view().occupants, ["alice"]);
    assert_invariants(&alice);
}
