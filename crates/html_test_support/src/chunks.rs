//! Chunk plans for streaming-equivalence tests.
//!
//! A plan says where an input is cut before being fed to a streaming
//! consumer. Deterministic plans cover fixed sizes and cuts around markup
//! punctuation; fuzz plans are seeded so a failure can be replayed with
//! `SCRUB_CHUNK_SEED`.

use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BoundaryPolicy {
    /// Cuts fall on UTF-8 character boundaries; chunks are `&str`.
    Utf8Aligned,
    /// Cuts may split a multi-byte character; the consumer must carry it.
    ByteStream,
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryPolicy::Utf8Aligned => f.write_str("utf8"),
            BoundaryPolicy::ByteStream => f.write_str("bytes"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChunkPlan {
    Fixed {
        size: usize,
        policy: BoundaryPolicy,
    },
    Boundaries {
        indices: Vec<usize>,
        policy: BoundaryPolicy,
    },
}

impl fmt::Display for ChunkPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkPlan::Fixed { size, policy } => write!(f, "fixed size={size} policy={policy}"),
            ChunkPlan::Boundaries { indices, policy } => write!(
                f,
                "boundaries count={} policy={policy} indices={indices:?}",
                indices.len()
            ),
        }
    }
}

impl ChunkPlan {
    pub fn fixed(size: usize) -> Self {
        Self::Fixed {
            size,
            policy: BoundaryPolicy::Utf8Aligned,
        }
    }

    pub fn fixed_unaligned(size: usize) -> Self {
        Self::Fixed {
            size,
            policy: BoundaryPolicy::ByteStream,
        }
    }

    pub fn boundaries(indices: impl Into<Vec<usize>>) -> Self {
        Self::Boundaries {
            indices: indices.into(),
            policy: BoundaryPolicy::Utf8Aligned,
        }
    }

    pub fn boundaries_unaligned(indices: impl Into<Vec<usize>>) -> Self {
        Self::Boundaries {
            indices: indices.into(),
            policy: BoundaryPolicy::ByteStream,
        }
    }

    pub fn policy(&self) -> BoundaryPolicy {
        match self {
            ChunkPlan::Fixed { policy, .. } | ChunkPlan::Boundaries { policy, .. } => *policy,
        }
    }

    /// Normalized cut points: sorted, deduplicated, inside `(0, len)`, and
    /// aligned when the policy asks for it.
    pub fn cut_points(&self, input: &str) -> Vec<usize> {
        let len = input.len();
        let raw: Vec<usize> = match self {
            ChunkPlan::Fixed { size, .. } => {
                assert!(*size > 0, "chunk size must be > 0");
                (1..)
                    .map(|i| i * size)
                    .take_while(|&idx| idx < len)
                    .collect()
            }
            ChunkPlan::Boundaries { indices, .. } => indices.clone(),
        };
        let mut points = filter_boundaries(input, &raw, self.policy());
        points.sort_unstable();
        points.dedup();
        points
    }

    /// Call `f` with each chunk in order.
    pub fn for_each_chunk(&self, input: &str, mut f: impl FnMut(&[u8])) {
        let bytes = input.as_bytes();
        let mut last = 0;
        for idx in self.cut_points(input) {
            f(&bytes[last..idx]);
            last = idx;
        }
        if last < bytes.len() || bytes.is_empty() {
            f(&bytes[last..]);
        }
    }

    /// `&str` chunks of a UTF-8 aligned plan.
    pub fn str_chunks<'a>(&self, input: &'a str) -> Vec<&'a str> {
        assert_eq!(
            self.policy(),
            BoundaryPolicy::Utf8Aligned,
            "str chunks need a UTF-8 aligned plan"
        );
        let mut chunks = Vec::new();
        let mut last = 0;
        for idx in self.cut_points(input) {
            chunks.push(&input[last..idx]);
            last = idx;
        }
        chunks.push(&input[last..]);
        chunks
    }
}

fn filter_boundaries(input: &str, indices: &[usize], policy: BoundaryPolicy) -> Vec<usize> {
    indices
        .iter()
        .copied()
        .filter(|&idx| idx > 0 && idx < input.len())
        .filter(|&idx| policy == BoundaryPolicy::ByteStream || input.is_char_boundary(idx))
        .collect()
}

#[derive(Clone, Debug)]
pub struct ChunkPlanCase {
    pub label: String,
    pub plan: ChunkPlan,
}

/// Seed for fuzz plans: `SCRUB_CHUNK_SEED` (decimal or `0x` hex) when set,
/// otherwise a fixed default.
pub fn fuzz_seed() -> u64 {
    const DEFAULT_SEED: u64 = 0x5c2b_0b5e_ed00_0001;
    let Ok(value) = std::env::var("SCRUB_CHUNK_SEED") else {
        return DEFAULT_SEED;
    };
    let value = value.trim();
    let parsed = match value.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.unwrap_or(DEFAULT_SEED)
}

/// Deterministic plans plus `fuzz_runs` seeded ones.
pub fn build_chunk_plans(
    input: &str,
    fuzz_runs: usize,
    seed: u64,
    policy: BoundaryPolicy,
) -> Vec<ChunkPlanCase> {
    let mut plans = Vec::new();
    for size in [1usize, 2, 3, 5, 8, 16, 64] {
        let plan = match policy {
            BoundaryPolicy::Utf8Aligned => ChunkPlan::fixed(size),
            BoundaryPolicy::ByteStream => ChunkPlan::fixed_unaligned(size),
        };
        plans.push(ChunkPlanCase {
            label: format!("fixed size={size}"),
            plan,
        });
    }

    let markup = markup_cut_points(input);
    if !markup.is_empty() {
        plans.push(ChunkPlanCase {
            label: format!("markup cuts count={}", markup.len()),
            plan: ChunkPlan::Boundaries {
                indices: markup.clone(),
                policy,
            },
        });
    }

    let mut candidates: Vec<usize> = (1..input.len()).collect();
    candidates.retain(|&idx| policy == BoundaryPolicy::ByteStream || input.is_char_boundary(idx));
    for i in 0..fuzz_runs {
        let run_seed = seed.wrapping_add(i as u64);
        let mut rng = Lcg::new(run_seed);
        let mut picks = candidates.clone();
        rng.shuffle(&mut picks);
        let count = 1 + rng.below(picks.len().clamp(1, 24));
        picks.truncate(count);
        picks.sort_unstable();
        plans.push(ChunkPlanCase {
            label: format!("fuzz seed=0x{run_seed:016x}"),
            plan: ChunkPlan::Boundaries {
                indices: picks,
                policy,
            },
        });
    }
    plans
}

/// Offsets right before and after markup punctuation and entity starts.
fn markup_cut_points(input: &str) -> Vec<usize> {
    let mut out = Vec::new();
    for (i, b) in input.bytes().enumerate() {
        if matches!(b, b'<' | b'>' | b'"' | b'\'' | b'=' | b'&' | b';' | b'{' | b'}') {
            out.push(i);
            out.push(i + 1);
        }
    }
    let mut out = filter_boundaries(input, &out, BoundaryPolicy::Utf8Aligned);
    out.dedup();
    out
}

#[derive(Clone, Copy, Debug)]
pub struct ShrinkStats {
    pub original_cuts: usize,
    pub minimized_cuts: usize,
    pub checks: usize,
    pub budget_exhausted: bool,
}

fn shrink_budget() -> usize {
    if let Ok(value) = std::env::var("SCRUB_SHRINK_CHECKS")
        && let Ok(parsed) = value.parse::<usize>()
        && parsed > 0
    {
        return parsed;
    }
    if std::env::var("CI").is_ok() { 1_000 } else { 10_000 }
}

/// Remove cut points from a failing plan while `fails` keeps reporting a
/// failure, so the reported plan is close to minimal.
pub fn shrink_chunk_plan_with_stats(
    input: &str,
    plan: &ChunkPlan,
    mut fails: impl FnMut(&ChunkPlan) -> bool,
) -> (ChunkPlan, ShrinkStats) {
    let policy = plan.policy();
    let max_checks = shrink_budget();
    let mut cuts = plan.cut_points(input);
    let original_cuts = cuts.len();
    let mut checks = 0;
    let mut budget_exhausted = false;

    // Halves first, then single cuts.
    let mut width = cuts.len().div_ceil(2).max(1);
    'outer: loop {
        let mut start = 0;
        let mut reduced = false;
        while start < cuts.len() {
            let end = (start + width).min(cuts.len());
            let mut candidate = cuts[..start].to_vec();
            candidate.extend_from_slice(&cuts[end..]);
            checks += 1;
            if checks > max_checks {
                budget_exhausted = true;
                break 'outer;
            }
            if fails(&ChunkPlan::Boundaries {
                indices: candidate.clone(),
                policy,
            }) {
                cuts = candidate;
                reduced = true;
            } else {
                start = end;
            }
        }
        if !reduced {
            if width == 1 {
                break;
            }
            width = width.div_ceil(2);
        }
    }

    let minimized_cuts = cuts.len();
    (
        ChunkPlan::Boundaries {
            indices: cuts,
            policy,
        },
        ShrinkStats {
            original_cuts,
            minimized_cuts,
            checks,
            budget_exhausted,
        },
    )
}

pub fn shrink_chunk_plan(
    input: &str,
    plan: &ChunkPlan,
    fails: impl FnMut(&ChunkPlan) -> bool,
) -> ChunkPlan {
    shrink_chunk_plan_with_stats(input, plan, fails).0
}

struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn below(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        (self.next_u64() >> 33) as usize % upper
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}
