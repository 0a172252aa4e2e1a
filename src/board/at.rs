//! Reply grammar shared by the two AT-command boards.

use crate::capability::{AddressType, ScanRawResult, ScanResult, ScanResultFormat, ScanResults};
use crate::protocol::escape;
use crate::transport::{pattern, Groups, SerialTransport};
use std::time::Duration;

pub(super) fn address_type(groups: &Groups, index: usize) -> Option<AddressType> {
    groups.parse::<u8>(index).and_then(AddressType::from_code)
}

/// Decode the scan report lines printed before the scan command's `OK`.
///
/// Addresses are reported in either case and normalised to upper case; the
/// RSSI is printed without its sign.
pub(super) fn scan_results(transport: &SerialTransport, format: ScanResultFormat) -> ScanResults {
    match format {
        ScanResultFormat::Default => {
            let re = pattern!(r#""([\w|:]{17})",([0|1]),-(\d+),(\d+)(,"(.+?)")?"#);
            let results = transport
                .search_all(re, Duration::ZERO)
                .iter()
                .filter_map(|g| {
                    Some(ScanResult {
                        addr: g.get(0)?.to_ascii_uppercase(),
                        addr_type: address_type(g, 1)?,
                        rssi: -g.parse::<i16>(2)?,
                        flag: g.parse(3)?,
                        name: g.get(5).map(str::to_owned),
                    })
                })
                .collect();
            ScanResults::Parsed(results)
        }
        ScanResultFormat::RawData => {
            let re = pattern!(r#""([\w|:]{17})",([0|1]),-(\d+),"((\\[0-9A-F]{2})+)""#);
            let results = transport
                .search_all(re, Duration::ZERO)
                .iter()
                .filter_map(|g| {
                    Some(ScanRawResult {
                        addr: g.get(0)?.to_ascii_uppercase(),
                        addr_type: address_type(g, 1)?,
                        rssi: -g.parse::<i16>(2)?,
                        raw_data: escape::decode(g.get(3)?),
                    })
                })
                .collect();
            ScanResults::Raw(results)
        }
    }
}
