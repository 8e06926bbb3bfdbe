use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use crate::foundation::core::FrameSize;
use crate::foundation::math::round_key;

/// Decimal places kept when curve strength becomes part of a cache key.
pub const CURVE_KEY_DECIMALS: u32 = 4;

/// Bounded map from a resolution key to an immutable derived value, evicting the least
/// recently used entry.
///
/// A capacity of zero disables storage: every lookup rebuilds.
#[derive(Debug)]
pub struct ResolutionCache<K, V> {
    name: &'static str,
    entries: HashMap<K, Arc<V>>,
    lru: VecDeque<K>,
    capacity: usize,
}

impl<K, V> ResolutionCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Empty cache. `name` only appears in log output.
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            entries: HashMap::new(),
            lru: VecDeque::new(),
            capacity,
        }
    }

    /// Maximum number of stored entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `key` is stored. Does not count as a use.
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Stored keys from least to most recently used.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.lru.iter()
    }

    /// Stored value for `key`, marking it most recently used.
    pub fn get(&mut self, key: &K) -> Option<Arc<V>> {
        let v = self.entries.get(key).cloned()?;
        self.touch(key.clone());
        Some(v)
    }

    /// Stored value for `key`, or the result of `build` (stored unless capacity is zero).
    pub fn get_or_insert_with(&mut self, key: K, build: impl FnOnce() -> V) -> Arc<V> {
        if let Some(v) = self.get(&key) {
            return v;
        }
        let v = Arc::new(build());
        if self.capacity > 0 {
            self.insert(key, Arc::clone(&v));
        }
        v
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
    }

    fn insert(&mut self, key: K, value: Arc<V>) {
        self.entries.insert(key.clone(), value);
        self.touch(key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.entries.remove(&old);
                tracing::debug!(cache = self.name, key = ?old, "evicted");
            }
        }
    }

    fn touch(&mut self, key: K) {
        if let Some(pos) = self.lru.iter().position(|k| *k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }
}

/// Per-pixel distance to the overlay center, normalized so the corner is 1.
///
/// Center is `(W / 2, H / 2)` with integer division.
#[derive(Debug)]
pub struct DistanceField {
    /// Field dimensions.
    pub size: FrameSize,
    normalized: Vec<f32>,
}

impl DistanceField {
    /// Compute the field for `size`.
    pub fn new(size: FrameSize) -> Self {
        let (w, h) = (size.width as usize, size.height as usize);
        let cx = f64::from(size.width / 2);
        let cy = f64::from(size.height / 2);
        let max_d = (cx * cx + cy * cy).sqrt() + 1e-6;
        let mut normalized = Vec::with_capacity(w * h);
        for y in 0..h {
            let dy = y as f64 - cy;
            for x in 0..w {
                let dx = x as f64 - cx;
                let nd = ((dx * dx + dy * dy).sqrt() / max_d).clamp(0.0, 1.0);
                normalized.push(nd as f32);
            }
        }
        Self { size, normalized }
    }

    /// Normalized distances, row-major.
    pub fn values(&self) -> &[f32] {
        &self.normalized
    }

    /// Normalized distance at `(x, y)`.
    pub fn at(&self, x: u32, y: u32) -> f32 {
        self.normalized[(y as usize) * (self.size.width as usize) + x as usize]
    }
}

/// Key of a [`WarpMap`]: resolution plus curve strength quantized to
/// [`CURVE_KEY_DECIMALS`] places.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WarpKey {
    /// Map width.
    pub width: u32,
    /// Map height.
    pub height: u32,
    /// `round(k * 10^4)`.
    pub curve_key: i64,
}

impl WarpKey {
    /// Key for `size` and raw curve strength `k`.
    pub fn new(size: FrameSize, k: f64) -> Self {
        Self {
            width: size.width,
            height: size.height,
            curve_key: round_key(k, CURVE_KEY_DECIMALS),
        }
    }

    /// Curve strength the key stands for.
    pub fn curve_strength(&self) -> f64 {
        self.curve_key as f64 / 10f64.powi(CURVE_KEY_DECIMALS as i32)
    }

    /// Resolution part of the key.
    pub fn size(&self) -> FrameSize {
        FrameSize {
            width: self.width,
            height: self.height,
        }
    }
}

/// Source row for every destination pixel of the parabolic warp.
///
/// `disp(x) = k * H * ((x - cx) / (W / 2))^2`; rows above the center sample `y + disp`,
/// the rest sample `y - disp`, clamped to `[0, H - 1]`. Columns are not displaced.
#[derive(Debug)]
pub struct WarpMap {
    /// Map dimensions.
    pub size: FrameSize,
    /// Quantized curve strength this map was built with.
    pub curve_strength: f64,
    map_y: Vec<f32>,
}

impl WarpMap {
    /// Build the map for `key`, using the key's quantized curve strength.
    pub fn new(key: WarpKey) -> Self {
        let size = key.size();
        let k = key.curve_strength();
        let (w, h) = (size.width as usize, size.height as usize);
        let cx = f64::from(size.width / 2);
        let cy = size.height / 2;
        let half_w = f64::from(size.width) / 2.0;
        let max_y = (h - 1) as f64;

        let disp: Vec<f64> = (0..w)
            .map(|x| {
                let nx = (x as f64 - cx) / half_w;
                k * h as f64 * nx * nx
            })
            .collect();

        let mut map_y = Vec::with_capacity(w * h);
        for y in 0..size.height {
            let yf = f64::from(y);
            for d in &disp {
                let src = if y < cy { yf + d } else { yf - d };
                map_y.push(src.clamp(0.0, max_y) as f32);
            }
        }
        Self {
            size,
            curve_strength: k,
            map_y,
        }
    }

    /// Source rows, row-major.
    pub fn rows(&self) -> &[f32] {
        &self.map_y
    }

    /// Source row for destination `(x, y)`.
    pub fn source_y(&self, x: u32, y: u32) -> f32 {
        self.map_y[(y as usize) * (self.size.width as usize) + x as usize]
    }
}

/// The two resolution caches owned by one compositor.
#[derive(Debug)]
pub struct HudCaches {
    /// Distance fields keyed by resolution.
    pub distance: ResolutionCache<FrameSize, DistanceField>,
    /// Warp maps keyed by resolution and quantized curve strength.
    pub warp: ResolutionCache<WarpKey, WarpMap>,
}

impl HudCaches {
    /// Empty caches with the given capacities.
    pub fn new(distance_capacity: usize, warp_capacity: usize) -> Self {
        Self {
            distance: ResolutionCache::new("distance_field", distance_capacity),
            warp: ResolutionCache::new("warp_map", warp_capacity),
        }
    }

    /// Distance field for `size`, computed on first use.
    pub fn distance_field(&mut self, size: FrameSize) -> Arc<DistanceField> {
        self.distance
            .get_or_insert_with(size, || DistanceField::new(size))
    }

    /// Warp map for `size` and curve strength `k`, computed on first use.
    pub fn warp_map(&mut self, size: FrameSize, k: f64) -> Arc<WarpMap> {
        let key = WarpKey::new(size, k);
        self.warp.get_or_insert_with(key, || WarpMap::new(key))
    }

    /// Drop every cached entry, e.g. after a large resolution change.
    pub fn clear(&mut self) {
        self.distance.clear();
        self.warp.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/hud/cache.rs"]
mod tests;
