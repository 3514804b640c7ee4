//! # Shader Forge (Binary)
//!
//! Main executable entry point.

fn main() -> anyhow::Result<()> {
    shader_forge_app::main()
}
