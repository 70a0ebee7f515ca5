use mc_manager::logs::{LogLevel, LogStore};

#[test]
fn test_retention_cap_keeps_newest() {
    let store = LogStore::new(3);
    for i in 0..5 {
        store.append(LogLevel::Info, format!("line {}", i));
    }

    let (lines, fingerprint) = store.read_tail(10);
    assert_eq!(fingerprint, 5);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].text, "line 2");
    assert_eq!(lines[2].text, "line 4");
}

#[test]
fn test_fingerprint_is_monotonic_across_eviction() {
    let store = LogStore::new(2);
    store.append(LogLevel::Info, "a");
    let fp1 = store.fingerprint();
    store.append(LogLevel::Info, "b");
    store.append(LogLevel::Info, "c");
    let fp2 = store.fingerprint();

    assert!(fp2 > fp1);
    assert_eq!(fp2, 3);
}

#[test]
fn test_read_since_returns_only_new_lines() {
    let store = LogStore::new(100);
    store.append(LogLevel::Info, "old");
    let (_, fp) = store.read_tail(100);

    let (none, same_fp) = store.read_since(fp);
    assert!(none.is_empty());
    assert_eq!(same_fp, fp);

    store.append(LogLevel::Warn, "new one");
    store.append(LogLevel::Error, "new two");
    let (fresh, new_fp) = store.read_since(fp);
    assert_eq!(fresh.len(), 2);
    assert_eq!(fresh[0].text, "new one");
    assert_eq!(fresh[1].text, "new two");
    assert_eq!(new_fp, fp + 2);
}

#[test]
fn test_read_since_behind_eviction_returns_whole_buffer() {
    let store = LogStore::new(2);
    for i in 0..10 {
        store.append(LogLevel::Info, format!("line {}", i));
    }

    // Poller last saw fingerprint 1; eight lines were appended since, but
    // only two survive in the buffer.
    let (lines, fp) = store.read_since(1);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].text, "line 8");
    assert_eq!(fp, 10);
}

#[test]
fn test_mirror_survives_reload() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = LogStore::with_mirror(100, dir.path());
        store.append(LogLevel::Info, "first");
        store.append(LogLevel::Success, "Server started");
    }
    assert!(dir.path().join("logs/unified.log").is_file());

    let reloaded = LogStore::with_mirror(100, dir.path());
    let (lines, fingerprint) = reloaded.read_tail(100);
    assert_eq!(fingerprint, 2);
    assert_eq!(lines[0].text, "first");
    assert_eq!(lines[1].level, LogLevel::Success);
    assert_eq!(lines[1].text, "Server started");
}

#[test]
fn test_mirror_reload_respects_capacity() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = LogStore::with_mirror(100, dir.path());
        for i in 0..10 {
            store.append(LogLevel::Info, format!("line {}", i));
        }
    }

    let reloaded = LogStore::with_mirror(3, dir.path());
    let (lines, _) = reloaded.read_tail(100);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].text, "line 7");
}
