#[cfg(test)]
mod tests {
    use std::fs;

    use content_stream::{
        ChecksumProvider, CompositeProvider, MemoryProvider, Method,
        RouteOptions, StreamConfig, StreamControl, StreamSession,
    };
    use tempdir::TempDir;

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn drain(session: &mut StreamSession, chunk_len: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut chunk = vec![0u8; chunk_len];
        let mut offset = 0u64;
        loop {
            let read = session.next_chunk(&mut chunk, offset);
            if read == 0 {
                break;
            }
            out.extend_from_slice(&chunk[..read]);
            offset += read as u64;
        }
        out
    }

    #[test]
    fn test_file_delivery_round_trip() {
        init_logs();
        let temp_dir = TempDir::new("delivery")
            .expect("Failed to create temporary directory");
        let file_path = temp_dir.path().join("firmware.bin");
        let content: Vec<u8> =
            (0..50_000).map(|i| (i * 7 % 256) as u8).collect();
        fs::write(&file_path, &content)
            .expect("Failed to write test file");

        let mut control =
            StreamControl::new(StreamConfig::default()).unwrap();
        control
            .register_file(
                Method::Get,
                "/firmware",
                &file_path,
                RouteOptions {
                    chunk_size: 1024,
                    ..RouteOptions::default()
                },
            )
            .expect("Failed to register file route");

        let mut session = control
            .open_session(Method::Get, "/firmware")
            .expect("Failed to open session");

        // length and type are known before the first chunk
        assert_eq!(session.total_size(), content.len() as u64);
        assert_eq!(
            session.mime_type(),
            "application/octet-stream"
        );

        let delivered = drain(&mut session, 4096);
        assert_eq!(delivered, content);
        assert_eq!(session.bytes_transferred(), content.len() as u64);
        assert!(!session.is_active());
    }

    #[test]
    fn test_transport_buffer_smaller_than_chunk() {
        let temp_dir = TempDir::new("delivery")
            .expect("Failed to create temporary directory");
        let file_path = temp_dir.path().join("page.html");
        let content: Vec<u8> =
            (0..9_999).map(|i| (i % 251) as u8).collect();
        fs::write(&file_path, &content)
            .expect("Failed to write test file");

        let mut control =
            StreamControl::new(StreamConfig::default()).unwrap();
        control
            .register_file(
                Method::Get,
                "/page",
                &file_path,
                RouteOptions::default(),
            )
            .unwrap();

        // the transport offers less room than the configured chunk
        let mut session =
            control.open_session(Method::Get, "/page").unwrap();
        assert_eq!(drain(&mut session, 777), content);
    }

    #[test]
    fn test_composite_delivery_with_checksum() {
        let head = b"<html><body>".to_vec();
        let body: Vec<u8> =
            (0..4_000).map(|i| b'a' + (i % 26) as u8).collect();
        let tail = b"</body></html>".to_vec();

        let mut expected = Vec::new();
        expected.extend_from_slice(&head);
        expected.extend_from_slice(&body);
        expected.extend_from_slice(&tail);

        let mut composite = CompositeProvider::new("text/html");
        composite
            .add_part(Box::new(MemoryProvider::owned(
                head,
                "text/html",
            )))
            .unwrap();
        composite
            .add_part(Box::new(MemoryProvider::owned(
                body,
                "text/html",
            )))
            .unwrap();
        composite
            .add_part(Box::new(MemoryProvider::owned(
                tail,
                "text/html",
            )))
            .unwrap();

        let provider = ChecksumProvider::new(Box::new(composite));

        let mut control =
            StreamControl::new(StreamConfig::default()).unwrap();
        control
            .register_provider(
                Method::Get,
                "/index.html",
                Box::new(provider),
                RouteOptions {
                    chunk_size: 512,
                    ..RouteOptions::default()
                },
            )
            .unwrap();

        let mut session = control
            .open_session(Method::Get, "/index.html")
            .unwrap();
        assert_eq!(session.mime_type(), "text/html");

        let delivered = drain(&mut session, 512);
        assert_eq!(delivered, expected);

        // the one-shot provider moved into the session; the route
        // cannot serve again
        assert!(control
            .open_session(Method::Get, "/index.html")
            .is_err());
    }

    #[test]
    fn test_generator_delivery_with_progress() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let total = 10_000u64;
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        let mut control =
            StreamControl::new(StreamConfig::default()).unwrap();
        control
            .register_generator(
                Method::Get,
                "/report.txt",
                |buf, offset| {
                    for (i, byte) in buf.iter_mut().enumerate() {
                        *byte = ((offset as usize + i) % 10) as u8 + b'0';
                    }
                    buf.len()
                },
                total,
                "text/plain",
                RouteOptions {
                    chunk_size: 2048,
                    progress: Some(Rc::new(move |sent, total| {
                        sink.borrow_mut().push((sent, total));
                    })),
                },
            )
            .unwrap();

        let mut session = control
            .open_session(Method::Get, "/report.txt")
            .unwrap();
        let delivered = drain(&mut session, 4096);

        assert_eq!(delivered.len() as u64, total);
        assert!(delivered
            .iter()
            .enumerate()
            .all(|(i, &byte)| byte == (i % 10) as u8 + b'0'));

        let progress = seen.borrow();
        assert_eq!(progress.len(), 5);
        assert_eq!(progress.first(), Some(&(2048, total)));
        assert_eq!(progress.last(), Some(&(total, total)));
    }

    #[test]
    fn test_rejected_registration_leaves_no_route() {
        let mut control =
            StreamControl::new(StreamConfig::default()).unwrap();
        let result = control.register_generator(
            Method::Get,
            "/gen",
            |buf, _| buf.len(),
            100,
            "text/plain",
            RouteOptions {
                chunk_size: 8193,
                ..RouteOptions::default()
            },
        );

        assert!(result.is_err());
        assert!(control.open_session(Method::Get, "/gen").is_err());
    }
}
