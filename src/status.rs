use crts_shared::link::UsbLink;
use crts_shared::{ControlTransport, Proxy};

pub fn command_list(vid: u16, pid: u16) -> anyhow::Result<()> {
    let devices = UsbLink::list_devices(vid, pid)?;

    if devices.is_empty() {
        log::info!("No {:04x}:{:04x} devices attached", vid, pid);
    }

    for dev in devices {
        println!("Bus {:03} Device {:03}: {:04x}:{:04x}", dev.bus, dev.address, vid, pid);
    }

    Ok(())
}

pub fn command_status<T: ControlTransport>(proxy: &mut Proxy<T>) -> anyhow::Result<()> {
    let report = proxy.read_status();

    if report.green.is_stale() || report.red.is_stale() {
        log::warn!("Status incomplete, some bytes were not read from the device");
    }

    print!("{}", report);
    Ok(())
}

pub fn command_ping<T: ControlTransport>(proxy: &mut Proxy<T>, code: u8) -> anyhow::Result<()> {
    let echo = proxy.ping(code)?;

    log::debug!("Sent {}, got {}", code, echo);
    println!("{}", echo);

    if echo != code {
        anyhow::bail!("ping mismatch: sent {}, got {}", code, echo);
    }
    Ok(())
}
