use crate::adapters::http::HttpClient;
use crate::domain::model::NicAddress;
use crate::utils::error::Result;
use std::net::IpAddr;
use std::time::Duration;
use sysinfo::Networks;

pub const DEFAULT_PUBLIC_IP_ENDPOINT: &str = "https://ipinfo.io/ip";
const PUBLIC_IP_TIMEOUT: Duration = Duration::from_secs(5);

/// 所有網卡上的 IPv4 位址，依網卡名稱排序
pub fn local_ipv4() -> Vec<NicAddress> {
    let networks = Networks::new_with_refreshed_list();
    let mut addresses: Vec<NicAddress> = networks
        .list()
        .iter()
        .flat_map(|(nic, data)| {
            data.ip_networks().iter().filter_map(move |network| match network.addr {
                IpAddr::V4(ip) => Some(NicAddress {
                    nic: nic.clone(),
                    ip,
                }),
                IpAddr::V6(_) => None,
            })
        })
        .collect();
    addresses.sort();
    addresses.dedup();
    addresses
}

pub async fn public_ip(client: &HttpClient, endpoint: &str) -> Result<String> {
    client.get_text(endpoint, PUBLIC_IP_TIMEOUT).await
}

pub fn format_local(addresses: &[NicAddress]) -> String {
    let mut out = String::from("Local:");
    for address in addresses {
        out.push_str(&format!("\n  {} ({})", address.ip, address.nic));
    }
    out
}

pub fn format_public(ip: &str) -> String {
    format!("Public:\n  {}", ip)
}
