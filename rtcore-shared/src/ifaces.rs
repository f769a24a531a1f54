//! Minimal network interface enumeration, used by host candidate gathering
//! (ICE) and mDNS responders to find the local addresses to advertise.

use std::net::IpAddr;

/// One address bound to a local network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub addr: IpAddr,
    pub loopback: bool,
}

#[cfg(not(windows))]
pub fn get_all() -> std::io::Result<Vec<Interface>> {
    use nix::ifaddrs::getifaddrs;
    use nix::sys::socket::SockaddrLike;

    let mut ifaces = Vec::new();
    for ifaddr in getifaddrs().map_err(std::io::Error::from)? {
        let Some(address) = ifaddr.address else {
            continue;
        };
        let ip = if let Some(sin) = address.as_sockaddr_in() {
            IpAddr::V4(std::net::Ipv4Addr::from(sin.ip()))
        } else if let Some(sin6) = address.as_sockaddr_in6() {
            IpAddr::V6(sin6.ip())
        } else {
            continue;
        };
        ifaces.push(Interface {
            name: ifaddr.interface_name,
            loopback: ip.is_loopback(),
            addr: ip,
        });
    }
    Ok(ifaces)
}

#[cfg(windows)]
pub fn get_all() -> std::io::Result<Vec<Interface>> {
    // Enumerating adapters on Windows goes through GetAdaptersAddresses via
    // winapi; until that's wired up we report no interfaces rather than
    // fail candidate gathering outright.
    Ok(Vec::new())
}

#[cfg(all(test, not(windows)))]
mod test {
    use super::*;

    #[test]
    fn get_all_includes_loopback() {
        let ifaces = get_all().expect("enumerating interfaces should not fail in test sandboxes");
        assert!(ifaces.iter().any(|i| i.loopback));
    }
}
