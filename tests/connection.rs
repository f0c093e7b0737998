use std::time::Duration;

use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedSender};

use ssdb_cluster::config::ClientConfig;
use ssdb_cluster::connection::Connection;
use ssdb_cluster::frame::{self, Frame};
use ssdb_cluster::Error;

async fn create_tcp_connection() -> Result<(UnboundedSender<Vec<u8>>, TcpStream), std::io::Error> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let local_addr = listener.local_addr()?;

    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            while let Some(data) = rx.recv().await {
                // Write the received channel data to the socket.
                if socket.write_all(&data).await.is_err() {
                    break;
                }
            }
        }
    });

    // Connect to the server as a client to complete the setup.
    let stream = TcpStream::connect(local_addr).await?;

    Ok((tx, stream))
}

fn frame(fields: &[&str]) -> Frame {
    Frame::new(fields.iter().map(|f| Bytes::from(f.to_string())).collect())
}

#[tokio::test]
async fn test_read_status_only() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream, &ClientConfig::default());

    tcp_stream_tx.send(b"9\nnot_found\n\n".to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, frame(&["not_found"]));
}

#[tokio::test]
async fn test_read_status_and_value() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream, &ClientConfig::default());

    tcp_stream_tx.send(b"2\nok\n5\nhello\n\n".to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, frame(&["ok", "hello"]));
    assert_eq!(connection.buffered(), 0);
}

#[tokio::test]
async fn test_read_binary_value() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream, &ClientConfig::default());

    tcp_stream_tx
        .send(b"2\nok\n4\na\nb\0\n\n".to_vec())
        .unwrap();

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual.payload(), &[Bytes::from_static(b"a\nb\0")]);
}

#[tokio::test]
async fn test_skip_keep_alive_lines() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream, &ClientConfig::default());

    tcp_stream_tx.send(b"\n\n2\nok\n\n".to_vec()).unwrap();

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, frame(&["ok"]));
}

#[tokio::test]
async fn test_read_multiple_frames_sequentially() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream, &ClientConfig::default());

    tcp_stream_tx.send(b"2\nok\n1\n1\n\n".to_vec()).unwrap();
    tcp_stream_tx
        .send(b"2\nok\n1\na\n1\n1\n1\nb\n1\n2\n\n9\nnot_found\n\n".to_vec())
        .unwrap();
    tcp_stream_tx
        .send(b"5\nerror\n4\nboom\n\n".to_vec())
        .unwrap();

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, frame(&["ok", "1"]));

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, frame(&["ok", "a", "1", "b", "2"]));

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, frame(&["not_found"]));

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, frame(&["error", "boom"]));
}

#[tokio::test]
async fn test_read_incomplete_frame() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream, &ClientConfig::default());

    // Reply split into three parts to simulate partial data arriving.
    // "2\nok\n5\nmykey\n7\nmyvalue\n\n"
    let part1 = b"2\no";
    let part2 = b"k\n5\nmyke";
    let part3 = b"y\n7\nmyvalue\n\n";

    tokio::spawn(async move {
        let parts = vec![part1.to_vec(), part2.to_vec(), part3.to_vec()];
        for part in parts {
            tcp_stream_tx.send(part).unwrap();
            // Simulate a delay in sending/receiving the data.
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    });

    let actual = connection.read_frame().await.unwrap();
    assert_eq!(actual, frame(&["ok", "mykey", "myvalue"]));
}

#[tokio::test]
async fn test_send_writes_bytes_verbatim() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut connection = Connection::connect(addr, &ClientConfig::default())
        .await
        .unwrap();
    let (socket, _) = listener.accept().await.unwrap();
    let mut server = Connection::new(socket, &ClientConfig::default());

    connection.send(b"3\nget\n1\na\n\n").await.unwrap();

    let actual = server.read_frame().await.unwrap();
    assert_eq!(actual, frame(&["get", "a"]));
}

#[tokio::test]
async fn test_peer_closing_is_a_reset() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream, &ClientConfig::default());

    // Half a frame, then the writer goes away.
    tcp_stream_tx.send(b"2\nok\n5\nhel".to_vec()).unwrap();
    drop(tcp_stream_tx);

    let err = connection.read_frame().await.unwrap_err();
    assert!(matches!(err, Error::ConnectionReset), "got {err:?}");
}

#[tokio::test]
async fn test_malformed_length() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let mut connection = Connection::new(tcp_stream, &ClientConfig::default());

    tcp_stream_tx.send(b"x2\nok\n\n".to_vec()).unwrap();

    let err = connection.read_frame().await.unwrap_err();
    assert!(
        matches!(err, Error::Protocol(frame::Error::InvalidLength(_))),
        "got {err:?}"
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_read_timeout() {
    let (_tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let config = ClientConfig::default().with_timeout(Duration::from_millis(100));
    let mut connection = Connection::new(tcp_stream, &config);

    let err = connection.read_frame().await.unwrap_err();
    assert!(matches!(err, Error::Timeout(limit) if limit == Duration::from_millis(100)));
}

#[tokio::test]
async fn test_frame_too_large() {
    let (tcp_stream_tx, tcp_stream) = create_tcp_connection().await.unwrap();
    let config = ClientConfig::default().with_max_frame_size(16);
    let mut connection = Connection::new(tcp_stream, &config);

    tcp_stream_tx
        .send(b"2\nok\n100\nthis value never ends".to_vec())
        .unwrap();

    let err = connection.read_frame().await.unwrap_err();
    assert!(matches!(err, Error::FrameTooLarge { limit: 16 }), "got {err:?}");
}
