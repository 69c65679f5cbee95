//! Deterministic `RunID` generation.
//!
//! `RunID(s) = RunID(s)` for any two `RunSpec`s with identical fields
//! (spec §8, invariant 1). The canonical encoding below fixes the "fixed
//! textual encoding" the spec leaves to the implementer.

use arena_types::{Params, ProviderId, Region, RunId, ScenarioId, SelfPlayBinding};
use sha2::{Digest, Sha256};

/// Render `Params` as a sorted, `\x1f`-joined `key=value` sequence so the
/// encoding never depends on map insertion order.
pub fn canonical_params(params: &Params) -> String {
    let mut parts = Vec::new();
    if let Some(t) = params.temperature {
        parts.push(format!("temperature={}", t));
    }
    if let Some(m) = params.max_tokens {
        parts.push(format!("max_tokens={}", m));
    }
    if let Some(s) = params.seed {
        parts.push(format!("seed={}", s));
    }
    for (key, value) in &params.extra {
        parts.push(format!("extra.{}={}", key, value));
    }
    parts.join("\u{1f}")
}

fn canonical_self_play(binding: Option<&SelfPlayBinding>) -> String {
    match binding {
        None => String::new(),
        Some(map) => map
            .iter()
            .map(|(role, provider)| format!("{}:{}", role, provider.as_str()))
            .collect::<Vec<_>>()
            .join("\u{1f}"),
    }
}

/// Stable 128-bit digest over `(scenario_id, provider_id, region,
/// canonical(params), self_play_binding)`, rendered as 32 lowercase hex
/// characters.
pub fn run_id(
    scenario_id: &ScenarioId,
    provider_id: &ProviderId,
    region: &Region,
    params: &Params,
    self_play_roles: Option<&SelfPlayBinding>,
) -> RunId {
    let mut hasher = Sha256::new();
    hasher.update(scenario_id.as_str().as_bytes());
    hasher.update(b"\x1e");
    hasher.update(provider_id.as_str().as_bytes());
    hasher.update(b"\x1e");
    hasher.update(region.as_str().as_bytes());
    hasher.update(b"\x1e");
    hasher.update(canonical_params(params).as_bytes());
    hasher.update(b"\x1e");
    hasher.update(canonical_self_play(self_play_roles).as_bytes());

    let digest = hasher.finalize();
    // Truncate the 256-bit SHA-256 digest to its first 16 bytes (128 bits).
    let truncated = &digest[..16];
    RunId::new(truncated.iter().map(|b| format!("{:02x}", b)).collect::<String>())
}
