//! 2-element LRU cache for chunk handles during light propagation.

/// Marks an empty slot. Chunk identities never have the top bits set.
const EMPTY_SLOT: u64 = u64::MAX;

/// 2-element LRU cache for recently resolved chunk handles.
///
/// Propagation mostly alternates between the cursor's chunk and at most one neighboring
/// chunk, so two slots avoid nearly all world lookups. Misses are cached too: a slot may
/// hold `None` for a chunk that is not loaded, so a cache only lives for a single pass.
pub(crate) struct ChunkCache<C> {
    /// Chunk identities of the cached slots ([`EMPTY_SLOT`] when unused).
    identities: [u64; 2],

    /// Cached handles, `None` for chunks that were not loaded.
    chunks: [Option<C>; 2],

    /// Access counters for LRU tracking (higher = more recent).
    access_counter: [u64; 2],

    /// Global access counter.
    global_counter: u64,
}

impl<C: Copy> ChunkCache<C> {
    /// Creates a new empty chunk cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            identities: [EMPTY_SLOT; 2],
            chunks: [None; 2],
            access_counter: [0; 2],
            global_counter: 0,
        }
    }

    /// Looks up a chunk identity.
    ///
    /// Returns `Some(handle)` on a hit, where `handle` is itself `None` for a cached miss.
    #[inline]
    pub fn get(&mut self, identity: u64) -> Option<Option<C>> {
        let slot = self.identities.iter().position(|&id| id == identity)?;
        self.global_counter += 1;
        self.access_counter[slot] = self.global_counter;
        Some(self.chunks[slot])
    }

    /// Inserts a lookup result, evicting the least recently used slot.
    pub fn insert(&mut self, identity: u64, chunk: Option<C>) {
        let slot = self
            .identities
            .iter()
            .position(|&id| id == identity)
            .unwrap_or_else(|| {
                if self.access_counter[0] <= self.access_counter[1] {
                    0
                } else {
                    1
                }
            });

        self.global_counter += 1;
        self.identities[slot] = identity;
        self.chunks[slot] = chunk;
        self.access_counter[slot] = self.global_counter;
    }

    /// Returns the cached handle for `identity`, resolving it with `load` on a miss.
    #[inline]
    pub fn get_or_load(&mut self, identity: u64, load: impl FnOnce() -> Option<C>) -> Option<C> {
        if let Some(chunk) = self.get(identity) {
            return chunk;
        }
        let chunk = load();
        self.insert(identity, chunk);
        chunk
    }
}
