use armature::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    armature::default()?.run()
}
