#[cfg(test)]
mod tests {
    use crate::cache::lru_k::LrukCache;
    use crate::cache::store::LocalCache;
    use crate::cache::view::ByteView;
    use std::sync::{Arc, Mutex};

    fn zeros(n: usize) -> ByteView {
        ByteView::from(vec![0u8; n])
    }

    // ============================================================
    // LRU-K ENGINE TESTS
    // ============================================================

    #[test]
    fn test_new_key_lands_on_probation() {
        let mut cache = LrukCache::new(50, 2, None);

        cache.add("9", zeros(0)).unwrap();

        assert_eq!(cache.fifo_len(), 1);
        assert!(cache.contains_fifo("9"));
        assert_eq!(cache.used_bytes(), 1, "entry costs key.len() + value.len()");
    }

    #[test]
    fn test_fifo_bound_evicts_oldest_probationary_key() {
        let mut cache = LrukCache::new(50, 2, None);

        cache.add("9", zeros(0)).unwrap();
        cache.add("8", zeros(0)).unwrap();
        cache.add("7", zeros(0)).unwrap();

        // "9" was the oldest probationary entry and never proved itself.
        assert_eq!(cache.fifo_len(), 2);
        assert!(!cache.contains_fifo("9"));
        assert!(cache.contains_fifo("8"));
        assert!(cache.contains_fifo("7"));
        assert_eq!(cache.main_len(), 0, "nothing was promoted yet");
    }

    #[test]
    fn test_second_touch_promotes_and_budget_evicts_probation_first() {
        let mut cache = LrukCache::new(50, 2, None);

        cache.add("9", zeros(0)).unwrap();
        cache.add("8", zeros(0)).unwrap();
        cache.add("7", zeros(0)).unwrap();

        // Second touch of "8" with a value that fills the budget: "8" is
        // promoted into the main LRU and probationary "7" is dropped to make
        // the bytes fit.
        cache.add("8", zeros(49)).unwrap();

        assert!(cache.contains_main("8"));
        assert!(!cache.contains_fifo("7"));
        assert_eq!(cache.fifo_len(), 0);
        assert_eq!(cache.used_bytes(), 50);
    }

    #[test]
    fn test_add_exceeding_capacity_is_rejected_without_mutation() {
        let mut cache = LrukCache::new(50, 2, None);
        cache.add("9", zeros(0)).unwrap();

        let err = cache.add("1", zeros(50)).unwrap_err();

        assert_eq!(err.to_string(), "add exceeds max capacity");
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.used_bytes(), 1);
    }

    #[test]
    fn test_get_promotes_from_probation() {
        let mut cache = LrukCache::new(64, 4, None);
        cache.add("a", zeros(3)).unwrap();

        assert!(cache.contains_fifo("a"));
        let hit = cache.get("a");

        assert_eq!(hit, Some(zeros(3)));
        assert!(cache.contains_main("a"));
        assert_eq!(cache.fifo_len(), 0);
        assert_eq!(cache.used_bytes(), 4, "promotion does not change sizes");
    }

    #[test]
    fn test_get_miss_is_not_an_error() {
        let mut cache = LrukCache::new(64, 4, None);
        assert_eq!(cache.get("absent"), None);
    }

    #[test]
    fn test_main_lru_evicts_coldest_on_update_overflow() {
        let mut cache = LrukCache::new(20, 4, None);

        // Promote three keys into the main LRU.
        for key in ["a", "b", "c"] {
            cache.add(key, zeros(3)).unwrap();
            cache.get(key);
        }
        // Recency now: a < b < c. Refresh "a" so "b" is the coldest.
        cache.get("a");

        // Growing "c" past the budget must drop from the main tail ("b").
        cache.add("c", zeros(12)).unwrap();

        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert_eq!(cache.get("c"), Some(zeros(12)));
    }

    #[test]
    fn test_remove_oldest_prefers_probation_over_main() {
        let mut cache = LrukCache::new(64, 4, None);
        cache.add("proven", zeros(0)).unwrap();
        cache.get("proven");
        cache.add("fresh", zeros(0)).unwrap();

        assert!(cache.remove_oldest());

        assert!(cache.contains_main("proven"));
        assert!(!cache.contains_fifo("fresh"));
    }

    #[test]
    fn test_eviction_hook_runs_after_bytes_are_released() {
        let evicted: Arc<Mutex<Vec<(String, usize)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = evicted.clone();
        let mut cache = LrukCache::new(64, 1, Some(Box::new(move |key, value| {
            sink.lock().unwrap().push((key.to_string(), value.len()));
        })));

        cache.add("first", zeros(2)).unwrap();
        cache.add("second", zeros(2)).unwrap();

        let log = evicted.lock().unwrap();
        assert_eq!(log.as_slice(), &[("first".to_string(), 2)]);
        drop(log);
        assert_eq!(cache.used_bytes(), "second".len() + 2);
    }

    #[test]
    fn test_budget_invariants_hold_across_mixed_workload() {
        let mut cache = LrukCache::new(128, 4, None);

        for round in 0..200usize {
            let key = format!("k{}", round % 23);
            cache.add(&key, zeros(round % 17)).unwrap();
            if round % 3 == 0 {
                cache.get(&key);
            }
            if round % 11 == 0 {
                cache.remove_oldest();
            }

            assert!(cache.used_bytes() <= 128);
            assert!(cache.fifo_len() <= 4);
            assert_eq!(cache.len(), cache.fifo_len() + cache.main_len());
        }
    }

    // ============================================================
    // THREAD-SAFE STORE TESTS
    // ============================================================

    #[test]
    fn test_store_roundtrip() {
        let store = LocalCache::new(64);
        store.add("key", ByteView::from(b"value".as_slice())).unwrap();

        assert_eq!(store.get("key"), Some(ByteView::from(b"value".as_slice())));
        assert_eq!(store.get("other"), None);
        assert_eq!(store.used_bytes(), "key".len() + "value".len());
    }

    #[test]
    fn test_store_is_shareable_across_tasks() {
        let store = Arc::new(LocalCache::new(4096));
        let mut handles = Vec::new();

        for worker in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    let key = format!("w{worker}-{i}");
                    store.add(&key, zeros(4)).unwrap();
                    store.get(&key);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(store.used_bytes() <= 4096);
    }
}
