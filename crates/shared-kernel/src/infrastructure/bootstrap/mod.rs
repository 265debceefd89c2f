// crates/shared-kernel/src/infrastructure/bootstrap/mod.rs

use tracing_subscriber::EnvFilter;

/// Initialisation des logs pour les binaires (`RUST_LOG` prioritaire sur `default_directive`).
/// Les logs partent sur stderr : stdout reste réservé aux sorties du binaire.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // Un second appel (tests, binaires embarqués) ne doit pas paniquer
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
