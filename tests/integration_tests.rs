//! Integration tests for the session replication protocol
//!
//! These tests validate cross-component interactions and real network
//! behavior: codec + transport over localhost UDP, the join handshakes,
//! and end-to-end replication between Host, Player-Client, and Spectator
//! replicas.

use chess::{Board, Color, Piece};
use host::network::Host;
use shared::message::parse_move;
use shared::{GameOutcome, GameSession, LifecyclePhase, Message, Role, Transport};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::sleep;

/// Polls a transport until something arrives or ~2s elapse.
async fn recv_with_patience(t: &Transport) -> Option<(Message, SocketAddr)> {
    for _ in 0..200 {
        if let Some(received) = t.poll_recv() {
            return Some(received);
        }
        sleep(Duration::from_millis(10)).await;
    }
    None
}

/// Asserts that nothing more arrives within a grace period.
async fn assert_silence(t: &Transport) {
    sleep(Duration::from_millis(150)).await;
    assert!(t.poll_recv().is_none(), "unexpected extra datagram");
}

/// NETWORK PROTOCOL TESTS
mod protocol_tests {
    use super::*;

    /// Tests message encode/decode round-trips for every wire tag
    #[tokio::test]
    async fn message_wire_roundtrip() {
        let test_messages = vec![
            Message::HelloClient,
            Message::HelloSpectator,
            Message::Welcome,
            Message::WelcomeSpectator,
            Message::Move(parse_move("g1f3").unwrap()),
            Message::Chat("Client: good luck".to_string()),
            Message::Resign,
            Message::Board(Board::default()),
            Message::Captured {
                white: vec![Piece::Pawn],
                black: vec![Piece::Queen, Piece::Knight],
            },
            Message::GameOver("White wins by checkmate!".to_string()),
        ];

        for message in test_messages {
            let wire = message.encode();
            assert!(wire.len() <= shared::MAX_DATAGRAM_SIZE);
            assert_eq!(Message::decode(&wire), Some(message));
        }
    }

    /// Tests real UDP communication through the transport adapter
    #[tokio::test]
    async fn udp_transport_communication() {
        let a = Transport::bind("127.0.0.1:0").await.unwrap();
        let b = Transport::bind("127.0.0.1:0").await.unwrap();

        a.send(b.local_addr().unwrap(), &Message::HelloClient);

        let (message, sender) = recv_with_patience(&b).await.expect("nothing arrived");
        assert_eq!(message, Message::HelloClient);
        assert_eq!(sender, a.local_addr().unwrap());
    }

    /// Tests forward tolerance: unknown tags are dropped, later traffic
    /// still flows
    #[tokio::test]
    async fn unknown_tags_do_not_poison_the_stream() {
        let a = Transport::bind("127.0.0.1:0").await.unwrap();
        let b = Transport::bind("127.0.0.1:0").await.unwrap();
        let b_addr = b.local_addr().unwrap();

        let raw = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        raw.send_to(b"PING:please", b_addr).await.unwrap();
        raw.send_to(b"MOVE:not-a-move", b_addr).await.unwrap();

        a.send(b_addr, &Message::Resign);

        // Only the well-formed message surfaces.
        let (message, _) = recv_with_patience(&b).await.expect("nothing arrived");
        assert_eq!(message, Message::Resign);
        assert_silence(&b).await;
    }
}

/// REPLICA SYNCHRONIZATION TESTS
mod replication_tests {
    use super::*;

    fn relayed(m: &Message) -> Message {
        Message::decode(&m.encode()).expect("relay decode failed")
    }

    /// Scenario A: the client replica tracks the host move-for-move
    #[test]
    fn first_move_replicates_exactly() {
        let mut host = GameSession::new(Role::Host, 600.0);
        let mut client = GameSession::new(Role::PlayerClient, 600.0);

        let m = parse_move("e2e4").unwrap();
        assert!(host.propose_local_move(m));

        match relayed(&Message::Move(m)) {
            Message::Move(received) => assert!(client.apply_remote_move(received)),
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(host.board(), client.board());
        assert_eq!(client.phase(), LifecyclePhase::InProgress);
    }

    /// Scenario B: a quiet move leaves every capture list empty
    #[test]
    fn quiet_move_keeps_capture_lists_empty() {
        let mut hosting = GameSession::new(Role::Host, 600.0);
        assert!(hosting.propose_local_move(parse_move("e2e4").unwrap()));
        assert!(hosting.captures().is_empty());

        let mut spectator = GameSession::new(Role::Spectator, 0.0);
        for message in host::relay::board_sync(&hosting) {
            match relayed(&message) {
                Message::Board(board) => spectator.apply_snapshot(board),
                Message::Captured { white, black } => spectator.replace_captures(white, black),
                other => panic!("unexpected {:?}", other),
            }
        }

        assert!(spectator.captures().is_empty());
        assert_eq!(spectator.board(), hosting.board());
    }

    /// Scenario D: a move that is illegal locally changes nothing and
    /// emits nothing
    #[test]
    fn diverged_move_is_dropped_silently() {
        let mut session = GameSession::new(Role::PlayerClient, 600.0);
        let before = *session.board();

        assert!(!session.apply_remote_move(parse_move("e2e5").unwrap()));
        assert_eq!(*session.board(), before);
        assert_eq!(session.phase(), LifecyclePhase::Waiting);
    }

    /// A capture propagates to the spectator through the combined push
    #[test]
    fn capture_reaches_spectator_lists() {
        let mut hosting = GameSession::new(Role::Host, 600.0);
        assert!(hosting.propose_local_move(parse_move("e2e4").unwrap()));
        assert!(hosting.apply_remote_move(parse_move("d7d5").unwrap()));
        assert!(hosting.propose_local_move(parse_move("e4d5").unwrap()));

        let mut spectator = GameSession::new(Role::Spectator, 0.0);
        for message in host::relay::board_sync(&hosting) {
            match relayed(&message) {
                Message::Board(board) => spectator.apply_snapshot(board),
                Message::Captured { white, black } => spectator.replace_captures(white, black),
                other => panic!("unexpected {:?}", other),
            }
        }

        assert_eq!(spectator.captures().black(), &[Piece::Pawn]);
        assert!(spectator.captures().white().is_empty());
    }

    /// Position text round-trips for positions reached over a real line
    #[test]
    fn position_snapshot_roundtrip() {
        let mut board = Board::default();
        for text in ["e2e4", "c7c5", "g1f3", "d7d6", "d2d4", "c5d4"] {
            board = board.make_move_new(parse_move(text).unwrap());
            match Message::decode(&Message::Board(board).encode()) {
                Some(Message::Board(restored)) => assert_eq!(restored, board),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    /// Both playing replicas independently conclude a mate reached over
    /// the wire
    #[test]
    fn checkmate_concludes_both_replicas() {
        let mut hosting = GameSession::new(Role::Host, 600.0);
        let mut client = GameSession::new(Role::PlayerClient, 600.0);

        let script = [
            (Role::Host, "f2f3"),
            (Role::PlayerClient, "e7e5"),
            (Role::Host, "g2g4"),
            (Role::PlayerClient, "d8h4"),
        ];

        for (mover, text) in script {
            let m = parse_move(text).unwrap();
            let (sender, receiver) = match mover {
                Role::Host => (&mut hosting, &mut client),
                _ => (&mut client, &mut hosting),
            };
            assert!(sender.propose_local_move(m));
            match relayed(&Message::Move(m)) {
                Message::Move(received) => assert!(receiver.apply_remote_move(received)),
                other => panic!("unexpected {:?}", other),
            }
        }

        let expected = GameOutcome::Checkmate {
            loser: Color::White,
        };
        assert_eq!(*hosting.outcome(), expected);
        assert_eq!(*client.outcome(), expected);
        assert_eq!(hosting.board(), client.board());
    }
}

/// JOIN HANDSHAKE AND FAN-OUT TESTS (real sockets, live host loop)
mod session_tests {
    use super::*;

    async fn running_host() -> (Host, String) {
        let host = Host::bind("127.0.0.1:0", 600.0).await.unwrap();
        host.spawn_inbound();
        let addr = host.local_addr().unwrap().to_string();
        (host, addr)
    }

    async fn joined_transport(addr: &str, hello: Message) -> Transport {
        let t = Transport::bind("127.0.0.1:0").await.unwrap();
        t.send(addr.parse().unwrap(), &hello);
        t
    }

    /// Scenario C: one hello, one welcome, registry updated
    #[tokio::test]
    async fn client_join_handshake() {
        let (host, addr) = running_host().await;
        let client = joined_transport(&addr, Message::HelloClient).await;

        let (message, _) = recv_with_patience(&client).await.expect("no welcome");
        assert_eq!(message, Message::Welcome);
        assert_silence(&client).await;

        assert_eq!(
            host.registry().lock().await.client_addr(),
            Some(client.local_addr().unwrap())
        );
    }

    /// A new spectator gets exactly one snapshot and at most ten chat
    /// lines, in original order
    #[tokio::test]
    async fn spectator_reconciliation_burst() {
        let (host, addr) = running_host().await;
        {
            let session_handle = host.session();
            let mut session = session_handle.lock().await;
            for i in 0..12 {
                session.append_chat(format!("line {}", i));
            }
        }

        let spectator = joined_transport(&addr, Message::HelloSpectator).await;

        let (message, _) = recv_with_patience(&spectator).await.expect("no welcome");
        assert_eq!(message, Message::WelcomeSpectator);

        let mut boards = 0;
        let mut chats = Vec::new();
        while let Some((message, _)) = recv_with_patience(&spectator).await {
            match message {
                Message::Board(_) => boards += 1,
                Message::Chat(text) => chats.push(text),
                other => panic!("unexpected {:?}", other),
            }
            // The join notice is the final replayed line.
            if chats.last().map(|c| c == "A spectator joined.") == Some(true) {
                break;
            }
        }

        assert_eq!(boards, 1);
        assert_eq!(chats.len(), 10);
        assert_eq!(chats[0], "line 3");
        assert_eq!(chats[8], "line 11");
        assert_silence(&spectator).await;
    }

    /// A client move is re-validated by the host and pushed to spectators
    /// as a snapshot plus capture lists
    #[tokio::test]
    async fn client_move_is_pushed_to_spectators() {
        let (host, addr) = running_host().await;
        let host_addr: SocketAddr = addr.parse().unwrap();

        let spectator = joined_transport(&addr, Message::HelloSpectator).await;
        // Drain the welcome burst: WELCOME_SPECTATOR, BOARD, one CHAT.
        for _ in 0..3 {
            recv_with_patience(&spectator).await.expect("burst cut short");
        }

        let client = joined_transport(&addr, Message::HelloClient).await;
        recv_with_patience(&client).await.expect("no welcome");

        // White must move first; feed the host a move as if typed locally.
        {
            let session_handle = host.session();
            let mut session = session_handle.lock().await;
            assert!(session.propose_local_move(parse_move("e2e4").unwrap()));
        }
        client.send(host_addr, &Message::Move(parse_move("e7e5").unwrap()));

        let (message, _) = recv_with_patience(&spectator).await.expect("no snapshot");
        let board = match message {
            Message::Board(board) => board,
            other => panic!("unexpected {:?}", other),
        };
        let (message, _) = recv_with_patience(&spectator).await.expect("no captures");
        assert_eq!(
            message,
            Message::Captured {
                white: vec![],
                black: vec![]
            }
        );

        let session_handle = host.session();
        let session = session_handle.lock().await;
        assert_eq!(*session.board(), board);
        assert_eq!(session.phase(), LifecyclePhase::InProgress);
    }

    /// Scenario E: a client resignation concludes the host and reaches
    /// every spectator as GAMEOVER
    #[tokio::test]
    async fn client_resignation_notifies_spectators() {
        let (host, addr) = running_host().await;
        let host_addr: SocketAddr = addr.parse().unwrap();

        let spectator = joined_transport(&addr, Message::HelloSpectator).await;
        for _ in 0..3 {
            recv_with_patience(&spectator).await.expect("burst cut short");
        }

        let client = joined_transport(&addr, Message::HelloClient).await;
        recv_with_patience(&client).await.expect("no welcome");

        client.send(host_addr, &Message::Resign);

        let (message, _) = recv_with_patience(&spectator).await.expect("no gameover");
        assert_eq!(
            message,
            Message::GameOver("Black resigned. White wins!".to_string())
        );

        let session_handle = host.session();
        let session = session_handle.lock().await;
        assert_eq!(
            *session.outcome(),
            GameOutcome::Resigned {
                loser: Color::Black
            }
        );
    }

    /// A second HELLO_CLIENT silently takes over the seat
    #[tokio::test]
    async fn second_client_join_evicts_first() {
        let (host, addr) = running_host().await;

        let first = joined_transport(&addr, Message::HelloClient).await;
        recv_with_patience(&first).await.expect("no welcome");

        let second = joined_transport(&addr, Message::HelloClient).await;
        recv_with_patience(&second).await.expect("no welcome");

        assert_eq!(
            host.registry().lock().await.client_addr(),
            Some(second.local_addr().unwrap())
        );
        // The evicted peer is never told.
        assert_silence(&first).await;
    }
}
