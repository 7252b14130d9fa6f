//! End-to-end channel tests against a scripted mock host.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use futures::{pin_mut, poll};
use rmpv::Value;

use common::{pump, ready_bridge, MockHost, RecordingTransport};
use webview_bridge_channel::{
    Bridge, ChannelError, CodeExecution, FileSystemOps, NullTransport,
};
use webview_bridge_protocol::{
    Envelope, ObjectRegistry, CODE_EXECUTOR, FILE_SYSTEM_HANDLER, METHOD_INVOKE, METHOD_SIGNAL,
    SIGNAL_FILE_DELETED,
};

#[test]
fn operations_unreachable_until_ready() -> Result<()> {
    let transport = RecordingTransport::new();
    let bridge = Bridge::initialize(Box::new(transport.clone()));

    assert!(!bridge.is_ready());
    assert!(matches!(bridge.file_system(), Err(ChannelError::NotReady)));
    assert!(matches!(bridge.code_executor(), Err(ChannelError::NotReady)));

    let mut host = MockHost::new();
    let init = transport.take_sent().pop().expect("handshake request");
    let response = host.handle(&init)?.expect("handshake response");
    bridge.handle_incoming(&response);

    assert!(bridge.is_ready());
    assert!(bridge.file_system().is_ok());
    assert!(bridge.code_executor().is_ok());
    Ok(())
}

#[test]
fn create_file_echoes_path_and_invokes_host_once() -> Result<()> {
    let mut host = MockHost::new();
    let (bridge, transport) = ready_bridge(&mut host)?;
    let fs = bridge.file_system()?;

    let echoed = fs.create_file("/notes/todo.txt", "buy milk")?;
    assert_eq!(echoed, "/notes/todo.txt");

    let sent = transport.take_sent();
    assert_eq!(sent.len(), 1);
    match Envelope::parse(&sent[0])? {
        Envelope::Notification { method, params } => {
            assert_eq!(method, METHOD_INVOKE);
            assert_eq!(params[0].as_str(), Some(FILE_SYSTEM_HANDLER));
            assert_eq!(params[1].as_str(), Some("createFile"));
            assert_eq!(
                params[2],
                Value::Array(vec![Value::from("/notes/todo.txt"), Value::from("buy milk")])
            );
        }
        other => panic!("expected a notification, got {other:?}"),
    }

    host.handle(&sent[0])?;
    assert_eq!(host.file("/notes/todo.txt"), Some("buy milk"));
    Ok(())
}

#[tokio::test]
async fn read_file_resolves_only_after_host_reply() -> Result<()> {
    let mut host = MockHost::with_files(&[("/etc/motd", "welcome")]);
    let (bridge, transport) = ready_bridge(&mut host)?;
    let fs = bridge.file_system()?;

    let read = fs.read_file("/etc/motd");
    pin_mut!(read);
    // The first poll fires the request; nothing resolves before the host replies.
    assert!(poll!(&mut read).is_pending());
    assert!(poll!(&mut read).is_pending());

    pump(&bridge, &transport, &mut host)?;
    assert_eq!(read.await?, "welcome");
    Ok(())
}

#[tokio::test]
async fn concurrent_reads_resolve_independently() -> Result<()> {
    let mut host = MockHost::with_files(&[("/a.txt", "alpha"), ("/b.txt", "beta")]);
    let (bridge, transport) = ready_bridge(&mut host)?;
    let fs = bridge.file_system()?;

    let first = fs.read_file("/a.txt");
    let second = fs.read_file("/b.txt");
    pin_mut!(first);
    pin_mut!(second);
    assert!(poll!(&mut first).is_pending());
    assert!(poll!(&mut second).is_pending());

    // Deliver the replies in reverse order of issue; correlation ids must
    // route each one to its own call.
    let mut replies = Vec::new();
    for sent in transport.take_sent() {
        if let Some(reply) = host.handle(&sent)? {
            replies.push(reply);
        }
    }
    for reply in replies.iter().rev() {
        bridge.handle_incoming(reply);
    }

    assert_eq!(first.await?, "alpha");
    assert_eq!(second.await?, "beta");
    Ok(())
}

#[test]
fn absent_transport_is_survivable() -> Result<()> {
    // No ambient transport: the placeholder carries nothing, nothing panics,
    // and the bridge simply never becomes ready.
    let stub = Bridge::initialize(Box::new(NullTransport));
    assert!(!stub.is_ready());
    assert!(matches!(stub.file_system(), Err(ChannelError::NotReady)));

    // A later construction over a live transport still comes up.
    let mut host = MockHost::new();
    let (bridge, _transport) = ready_bridge(&mut host)?;
    assert!(bridge.is_ready());
    Ok(())
}

#[test]
fn delete_directory_echoes_whether_or_not_it_exists() -> Result<()> {
    let mut host = MockHost::new();
    let (bridge, transport) = ready_bridge(&mut host)?;
    let fs = bridge.file_system()?;

    assert!(!host.has_directory("/tmp/x"));
    assert_eq!(fs.delete_directory("/tmp/x")?, "/tmp/x");

    pump(&bridge, &transport, &mut host)?;
    assert!(!host.has_directory("/tmp/x"));
    Ok(())
}

#[tokio::test]
async fn read_failure_surfaces_host_error() -> Result<()> {
    let mut host = MockHost::new();
    let (bridge, transport) = ready_bridge(&mut host)?;
    let fs = bridge.file_system()?;

    let read = fs.read_file("/missing.txt");
    pin_mut!(read);
    assert!(poll!(&mut read).is_pending());

    pump(&bridge, &transport, &mut host)?;
    match read.await {
        Err(ChannelError::Host(message)) => assert!(message.contains("/missing.txt")),
        other => panic!("expected a host error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn signals_fan_out_to_subscribers() -> Result<()> {
    let mut host = MockHost::new();
    let (bridge, _transport) = ready_bridge(&mut host)?;

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    bridge.on_signal(move |event| {
        sink.borrow_mut()
            .push((event.object.clone(), event.name.clone()));
    });

    let signal = Envelope::notification(
        METHOD_SIGNAL,
        vec![
            Value::from(FILE_SYSTEM_HANDLER),
            Value::from(SIGNAL_FILE_DELETED),
            Value::Array(vec![Value::from("/old.txt")]),
        ],
    );
    bridge.handle_incoming(&signal);

    assert_eq!(
        seen.borrow().as_slice(),
        &[(
            FILE_SYSTEM_HANDLER.to_string(),
            SIGNAL_FILE_DELETED.to_string()
        )]
    );
    Ok(())
}

#[test]
fn proxies_fail_closed_once_the_bridge_is_gone() -> Result<()> {
    let mut host = MockHost::new();
    let (bridge, _transport) = ready_bridge(&mut host)?;
    let fs = bridge.file_system()?;

    drop(bridge);
    assert!(matches!(
        fs.create_file("/a.txt", "content"),
        Err(ChannelError::Closed)
    ));
    Ok(())
}

#[tokio::test]
async fn pending_read_resolves_closed_when_the_bridge_drops() -> Result<()> {
    let mut host = MockHost::with_files(&[("/a.txt", "alpha")]);
    let (bridge, _transport) = ready_bridge(&mut host)?;
    let fs = bridge.file_system()?;

    let read = fs.read_file("/a.txt");
    pin_mut!(read);
    assert!(poll!(&mut read).is_pending());

    drop(bridge);
    assert!(matches!(read.await, Err(ChannelError::Closed)));
    Ok(())
}

#[test]
fn code_executor_forwards_payloads() -> Result<()> {
    let mut host = MockHost::new();
    let (bridge, transport) = ready_bridge(&mut host)?;
    let executor = bridge.code_executor()?;

    executor.execute_signal(Value::from("console.log('hi')"))?;

    let sent = transport.take_sent();
    assert_eq!(sent.len(), 1);
    match Envelope::parse(&sent[0])? {
        Envelope::Notification { params, .. } => {
            assert_eq!(params[0].as_str(), Some(CODE_EXECUTOR));
            assert_eq!(params[1].as_str(), Some("executeSignal"));
        }
        other => panic!("expected a notification, got {other:?}"),
    }
    host.handle(&sent[0])?;
    Ok(())
}

#[test]
fn missing_registry_object_is_reported() -> Result<()> {
    let transport = RecordingTransport::new();
    let bridge = Bridge::initialize(Box::new(transport.clone()));

    let init = transport.take_sent().pop().expect("handshake request");
    let Envelope::Request { msgid, .. } = Envelope::parse(&init)? else {
        panic!("expected handshake request");
    };

    // Host only exposes the file-system handler.
    let mut registry = ObjectRegistry::new();
    registry.insert(FILE_SYSTEM_HANDLER, &["readFile"]);
    bridge.handle_incoming(&Envelope::response_ok(msgid, registry.to_value()?));

    assert!(bridge.file_system().is_ok());
    assert!(matches!(
        bridge.code_executor(),
        Err(ChannelError::UnknownObject(name)) if name == CODE_EXECUTOR
    ));
    Ok(())
}
