// ─────────────────────────────────────────────────────────────────────
// SSPIKE Rates — Core
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Supernova neutrino event rates in a liquid-scintillator detector.
//!
//! Leaves: cross_section, quenching, integrator
//! Channels: basic (IBD, ν-e), elastic (ν-p NC), dispatch in channels
//! Reduction: totals, detector selection
//! Orchestration: supernova naming, cache, io, pipeline

pub mod basic;
pub mod cache;
pub mod channels;
pub mod cross_section;
pub mod detector;
pub mod elastic;
pub mod integrator;
pub mod io;
pub mod pipeline;
pub mod quenching;
pub mod supernova;
pub mod totals;
