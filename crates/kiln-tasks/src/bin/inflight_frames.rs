fn main() -> anyhow::Result<()> {
    kiln_tasks::run(kiln_tasks::TaskConfig::inflight_frames())
}
