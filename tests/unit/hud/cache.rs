use super::*;

fn size(w: u32, h: u32) -> FrameSize {
    FrameSize::new(w, h).unwrap()
}

#[test]
fn fifth_key_evicts_least_recently_used() {
    let mut c: ResolutionCache<FrameSize, u32> = ResolutionCache::new("test", 4);
    assert_eq!(c.capacity(), 4);
    for w in 1..=4 {
        c.get_or_insert_with(size(w, 1), || w);
    }
    // touch the oldest so the second-oldest becomes LRU
    assert_eq!(c.get(&size(1, 1)).as_deref(), Some(&1));
    c.get_or_insert_with(size(5, 1), || 5);

    assert_eq!(c.len(), 4);
    assert!(!c.contains(&size(2, 1)));
    for w in [1, 3, 4, 5] {
        assert!(c.contains(&size(w, 1)), "missing {w}");
    }
    let order: Vec<u32> = c.keys().map(|k| k.width).collect();
    assert_eq!(order, vec![3, 4, 1, 5]);
}

#[test]
fn hit_does_not_rebuild() {
    let mut c: ResolutionCache<u8, String> = ResolutionCache::new("test", 2);
    let a = c.get_or_insert_with(1, || "first".to_owned());
    let b = c.get_or_insert_with(1, || panic!("rebuilt"));
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn zero_capacity_never_stores() {
    let mut c: ResolutionCache<u8, u8> = ResolutionCache::new("test", 0);
    assert_eq!(*c.get_or_insert_with(1, || 7), 7);
    assert!(c.is_empty());
    assert_eq!(*c.get_or_insert_with(1, || 8), 8);
}

#[test]
fn clear_empties_both_caches() {
    let mut caches = HudCaches::new(4, 4);
    caches.distance_field(size(8, 6));
    caches.warp_map(size(8, 6), 0.03);
    caches.clear();
    assert!(caches.distance.is_empty());
    assert!(caches.warp.is_empty());
}

#[test]
fn curve_jitter_shares_one_warp_entry() {
    let mut caches = HudCaches::new(4, 4);
    let a = caches.warp_map(size(16, 8), 0.03);
    let b = caches.warp_map(size(16, 8), 0.030_000_01);
    assert!(Arc::ptr_eq(&a, &b));
    caches.warp_map(size(16, 8), 0.031);
    assert_eq!(caches.warp.len(), 2);
}

#[test]
fn distance_field_is_zero_at_center_and_one_at_corner() {
    let f = DistanceField::new(size(9, 7));
    assert_eq!(f.at(4, 3), 0.0);
    assert!((f.at(0, 0) - 1.0).abs() < 1e-5);
    assert!(f.values().iter().all(|v| (0.0..=1.0).contains(v)));
    assert_eq!(f.values().len(), 63);
}

#[test]
fn warp_map_is_identity_on_center_column_and_symmetric() {
    let m = WarpMap::new(WarpKey::new(size(20, 10), 0.1));
    assert_eq!(m.curve_strength, 0.1);
    for y in 0..10 {
        assert_eq!(m.source_y(10, y), y as f32);
    }
    // left edge: nx = -1 -> disp = 0.1 * 10 = 1
    assert!((m.source_y(0, 2) - 3.0).abs() < 1e-6);
    assert!((m.source_y(0, 7) - 6.0).abs() < 1e-6);
    // bottom half samples from above
    assert_eq!(m.source_y(0, 0), 1.0);
    assert_eq!(m.source_y(0, 9), 8.0);
    // displacement grows away from center
    assert!(m.source_y(2, 2) > m.source_y(6, 2));
}

#[test]
fn zero_curve_map_is_identity() {
    let m = WarpMap::new(WarpKey::new(size(6, 4), 0.0));
    for y in 0..4 {
        for x in 0..6 {
            assert_eq!(m.source_y(x, y), y as f32);
        }
    }
}
