use crts_shared::{ControlTransport, Proxy};

pub fn command_set<T: ControlTransport>(proxy: &mut Proxy<T>, codes: &str) -> anyhow::Result<()> {
    proxy.write_all(codes.as_bytes());
    log::info!("Sent {} code(s)", codes.len());

    Ok(())
}
