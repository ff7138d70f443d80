// ─── Launcher Distro Core ───
// Glue between the launcher and its remote distribution.
//
// Architecture:
//   core/
//     config/     — Read-only config accessor + file-backed impl
//     patterns/   — Glob-style ignore pattern matching
//     validation/ — Filters ignored entries out of validation reports
//     distro/     — Manifest URL resolution + client facade with fallback
//     repair/     — Repair worker wrapper with ignore-pattern injection

pub mod config;
pub mod distro;
pub mod error;
pub mod http;
pub mod patterns;
pub mod repair;
pub mod validation;
