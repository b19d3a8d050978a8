//! Activity tracking - which chunks of the grid need sweeping

/// Per-chunk activity flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Chunk {
    /// Skipped by the sweep while set
    pub sleeping: bool,
    /// Some cell in this chunk was written since the last `begin_tick`
    pub touched_this_tick: bool,
}

/// Fixed partition of the grid into square chunks
///
/// Edge chunks are partial when the grid size is not a multiple of the chunk
/// size. The partition never changes after construction.
pub struct ChunkManager {
    chunks: Vec<Chunk>,
    chunk_size: usize,
    cols: usize,
    rows: usize,
    width: usize,
    height: usize,
    /// When false every chunk is swept every tick
    pub enabled: bool,
    /// Also wake adjacent chunks for writes on a chunk border
    pub wake_neighbors: bool,
}

impl ChunkManager {
    pub fn new(width: usize, height: usize, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let cols = width.div_ceil(chunk_size);
        let rows = height.div_ceil(chunk_size);
        Self {
            chunks: vec![Chunk::default(); cols * rows],
            chunk_size,
            cols,
            rows,
            width,
            height,
            enabled: true,
            wake_neighbors: false,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn total(&self) -> usize {
        self.chunks.len()
    }

    fn index(&self, cx: usize, cy: usize) -> usize {
        cy * self.cols + cx
    }

    pub fn get(&self, cx: usize, cy: usize) -> Option<&Chunk> {
        if cx < self.cols && cy < self.rows {
            Some(&self.chunks[self.index(cx, cy)])
        } else {
            None
        }
    }

    pub fn is_sleeping(&self, cx: usize, cy: usize) -> bool {
        self.get(cx, cy).is_some_and(|c| c.sleeping)
    }

    /// Whether the sweep should visit this chunk
    pub fn is_active(&self, cx: usize, cy: usize) -> bool {
        !self.enabled || !self.is_sleeping(cx, cy)
    }

    /// Start a tick: chunks untouched since the previous call go to sleep
    pub fn begin_tick(&mut self) {
        for chunk in &mut self.chunks {
            if !chunk.touched_this_tick {
                chunk.sleeping = true;
            }
            chunk.touched_this_tick = false;
        }
    }

    fn wake_chunk(&mut self, cx: usize, cy: usize) {
        let idx = self.index(cx, cy);
        let chunk = &mut self.chunks[idx];
        chunk.sleeping = false;
        chunk.touched_this_tick = true;
    }

    /// Wake the chunk owning cell (x, y). Out-of-range cells are ignored.
    pub fn wake_at(&mut self, x: usize, y: usize) {
        if x >= self.width || y >= self.height {
            return;
        }
        let cx = x / self.chunk_size;
        let cy = y / self.chunk_size;
        self.wake_chunk(cx, cy);

        if !self.wake_neighbors {
            return;
        }
        let lx = x % self.chunk_size;
        let ly = y % self.chunk_size;
        let dxs = Self::border_offsets(lx, self.chunk_size, cx, self.cols);
        let dys = Self::border_offsets(ly, self.chunk_size, cy, self.rows);
        for dy in dys.into_iter().flatten() {
            for dx in dxs.into_iter().flatten() {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let ncx = (cx as i32 + dx) as usize;
                let ncy = (cy as i32 + dy) as usize;
                self.wake_chunk(ncx, ncy);
            }
        }
    }

    /// Offsets {0, and -1/+1 when the local coordinate sits on that border}
    fn border_offsets(local: usize, size: usize, chunk: usize, count: usize) -> [Option<i32>; 2] {
        let neighbor = if local == 0 && chunk > 0 {
            Some(-1)
        } else if local + 1 == size && chunk + 1 < count {
            Some(1)
        } else {
            None
        };
        [Some(0), neighbor]
    }

    pub fn wake_all(&mut self) {
        for chunk in &mut self.chunks {
            chunk.sleeping = false;
            chunk.touched_this_tick = true;
        }
    }

    /// Number of chunks the next sweep will visit
    pub fn active_count(&self) -> usize {
        if !self.enabled {
            return self.total();
        }
        self.chunks.iter().filter(|c| !c.sleeping).count()
    }

    /// Cell range `(x0, y0, x1, y1)` covered by a chunk, end-exclusive and
    /// clipped to the grid
    pub fn bounds(&self, cx: usize, cy: usize) -> (usize, usize, usize, usize) {
        let x0 = cx * self.chunk_size;
        let y0 = cy * self.chunk_size;
        let x1 = (x0 + self.chunk_size).min(self.width);
        let y1 = (y0 + self.chunk_size).min(self.height);
        (x0, y0, x1, y1)
    }
}
