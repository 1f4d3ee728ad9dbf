#[cfg(test)]
mod tests {
    use crate::singleflight::FlightGroup;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_calls_share_one_execution() {
        let flight: Arc<FlightGroup<Vec<u8>>> = Arc::new(FlightGroup::new());
        let executions = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let flight = flight.clone();
            let executions = executions.clone();
            handles.push(tokio::spawn(async move {
                flight
                    .run("hello", async {
                        executions.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(500)).await;
                        Ok(b"hello".to_vec())
                    })
                    .await
            }));
        }

        for handle in handles {
            let value = handle.await.unwrap().unwrap();
            assert_eq!(value, b"hello");
        }
        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert_eq!(flight.in_flight(), 0, "completed call must be forgotten");
    }

    #[tokio::test]
    async fn test_completed_key_is_forgotten_between_windows() {
        let flight: FlightGroup<u32> = FlightGroup::new();
        let executions = AtomicUsize::new(0);

        for _ in 0..2 {
            let value = flight
                .run("k", async {
                    executions.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await
                .unwrap();
            assert_eq!(value, 7);
        }

        // Two sequential windows, two executions: there is no memoization.
        assert_eq!(executions.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_error_reaches_every_waiter() {
        let flight: Arc<FlightGroup<u32>> = Arc::new(FlightGroup::new());

        let mut handles = Vec::new();
        for _ in 0..3 {
            let flight = flight.clone();
            handles.push(tokio::spawn(async move {
                flight
                    .run("broken", async {
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Err(anyhow!("backing store unavailable"))
                    })
                    .await
            }));
        }

        for handle in handles {
            let err = handle.await.unwrap().unwrap_err();
            assert!(err.to_string().contains("backing store unavailable"));
        }
    }

    #[tokio::test]
    async fn test_panicking_call_resolves_to_error() {
        let flight: Arc<FlightGroup<u32>> = Arc::new(FlightGroup::new());

        let waiter = {
            let flight = flight.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                flight
                    .run("explosive", async {
                        std::future::pending::<()>().await;
                        unreachable!()
                    })
                    .await
            })
        };

        let err = flight
            .run("explosive", async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                panic!("loader blew up");
            })
            .await
            .unwrap_err();

        assert!(err
            .to_string()
            .starts_with("call panicked and recovered in single flight"));
        assert!(err.to_string().contains("loader blew up"));

        // The waiter joined the same flight and must see the same failure.
        let waiter_err = waiter.await.unwrap().unwrap_err();
        assert!(waiter_err
            .to_string()
            .starts_with("call panicked and recovered in single flight"));
        assert_eq!(flight.in_flight(), 0, "panicked call must be cleaned up");
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block_each_other() {
        let flight: Arc<FlightGroup<&'static str>> = Arc::new(FlightGroup::new());

        let slow = {
            let flight = flight.clone();
            tokio::spawn(async move {
                flight
                    .run("slow", async {
                        tokio::time::sleep(Duration::from_millis(300)).await;
                        Ok("slow")
                    })
                    .await
            })
        };

        // A different key completes while "slow" is still in flight.
        let fast = flight.run("fast", async { Ok("fast") }).await.unwrap();
        assert_eq!(fast, "fast");

        assert_eq!(slow.await.unwrap().unwrap(), "slow");
    }
}
