use std::path::Path;

pub fn run(root: &Path, port: u16) -> anyhow::Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();
    rt.block_on(async move {
        tokio::select! {
            res = roster_server::serve(root_buf, port) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    })
}
