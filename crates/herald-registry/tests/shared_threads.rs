//! Integration tests for cross-thread use and default diagnostics.

use herald_event::{Event, EventArgs};
use herald_registry::testing::CallLog;
use herald_registry::{Listener, ListenerRegistry, RegistryConfig, SharedRegistry};
use parking_lot::Mutex;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

// =============================================================================
// Threads
// =============================================================================

mod threads {
    use super::*;

    #[test]
    fn concurrent_registration_and_dispatch() {
        let reg = SharedRegistry::<EventArgs>::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let reg = reg.clone();
                let hits = Arc::clone(&hits);
                thread::spawn(move || {
                    for _ in 0..25 {
                        let hits = Arc::clone(&hits);
                        reg.add_listener(
                            "tick".to_string(),
                            Listener::new(move |_: &EventArgs| {
                                hits.fetch_add(1, Ordering::SeqCst);
                            }),
                        );
                        reg.dispatch(&EventArgs::new("tick"));
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().expect("worker thread should not panic");
        }

        assert_eq!(reg.listener_count(&"tick".to_string()), 100);
        hits.store(0, Ordering::SeqCst);
        assert!(reg.dispatch(&EventArgs::new("tick")));
        assert_eq!(hits.load(Ordering::SeqCst), 100);
    }

    #[test]
    fn depth_limit_is_per_thread() {
        let reg = SharedRegistry::from_registry(ListenerRegistry::<EventArgs>::with_config(
            RegistryConfig::default().with_max_dispatch_depth(1),
        ));
        let log = CallLog::<EventArgs>::new();
        reg.add_listener("inner".to_string(), log.listener("inner"));

        // A dispatch on another thread does not count against this one.
        let handle = reg.clone();
        reg.add_listener(
            "outer".to_string(),
            Listener::new(move |_: &EventArgs| {
                let handle = handle.clone();
                thread::spawn(move || handle.dispatch(&EventArgs::new("inner")))
                    .join()
                    .expect("inner dispatch thread should not panic");
            }),
        );

        assert!(reg.dispatch(&EventArgs::new("outer")));
        assert_eq!(log.count("inner"), 1);
    }
}

// =============================================================================
// Tracing
// =============================================================================

mod tracing_output {
    use super::*;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(f: impl FnOnce()) -> String {
        let out = Captured::default();
        let writer = out.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        out.text()
    }

    #[test]
    fn listener_failure_is_logged_with_tag() {
        let text = capture(|| {
            let mut reg = ListenerRegistry::<EventArgs>::with_config(
                RegistryConfig::default().with_name("editor"),
            );
            reg.add_listener(
                "save".to_string(),
                Listener::try_new(|_: &EventArgs| Err("disk full")),
            );
            assert!(reg.dispatch(&EventArgs::new("save")));
        });

        let warnings: Vec<&str> = text.lines().filter(|l| l.contains("WARN")).collect();
        assert_eq!(warnings.len(), 1, "got: {text}");
        let line = warnings[0];
        assert!(line.contains("listener failed while firing event"), "got: {line}");
        assert!(line.contains("tag=save"), "got: {line}");
        assert!(line.contains("registry=\"editor\""), "got: {line}");
        assert!(line.contains("LISTENER_FAILED"), "got: {line}");
        assert!(!text.contains("ERROR"), "got: {text}");
    }

    #[test]
    fn capacity_refusal_is_logged() {
        let text = capture(|| {
            let mut reg = ListenerRegistry::<EventArgs>::with_config(
                RegistryConfig::default().with_max_listeners(1),
            );
            assert!(reg.add_listener("save".to_string(), Listener::new(|_: &EventArgs| {})));
            assert!(!reg.add_listener("save".to_string(), Listener::new(|_: &EventArgs| {})));
        });

        assert!(text.contains("listener capacity reached"), "got: {text}");
        assert!(text.contains("listener added"), "got: {text}");
    }

    #[test]
    fn event_tag_matches_payload_type() {
        let args = EventArgs::new("close");
        assert_eq!(args.tag(), "close");
        let text = capture(|| {
            let reg = ListenerRegistry::<EventArgs>::new();
            assert!(!reg.dispatch(&args));
        });
        // unheard events are not failures
        assert!(!text.contains("WARN"), "got: {text}");
        assert!(!text.contains("ERROR"), "got: {text}");
    }
}
