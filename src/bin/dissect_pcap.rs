//! Dissect acknowledgment subpacket streams out of a packet capture.
//!
//! Usage: `dissect_pcap <capture.pcap[ng]> <session.manifest> [--dump[=path]]
//! [--verbose] [--legacy-bound]`
//!
//! Each IPv4/UDP payload in the capture is treated as one buffer of
//! back-to-back subpackets, dissected under the session loaded from the
//! manifest. Counters go to stderr; `--dump` writes per-subpacket summaries
//! (and hex for rejected ranges) to stdout or a file. `--legacy-bound`
//! switches the schema-index check to the historic boundary for parity runs
//! against old captures.

use pcap_parser::pcapng::Block as PcapNgBlock;
use pcap_parser::traits::{PcapNGPacketBlock, PcapReaderIterator};
use pcap_parser::{Linktype, PcapBlockOwned, PcapError};
use replack::{dissect_stream, parse_manifest, IndexBound, SessionContext};
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;

#[derive(Default)]
struct Report {
    packets: u64,
    udp_payloads: u64,
    decoded: u64,
    failed: u64,
    first_error: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let mut raw_args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = if let Some(pos) = raw_args.iter().position(|a| a == "--verbose" || a == "-v") {
        raw_args.remove(pos);
        true
    } else {
        false
    };
    let legacy_bound =
        if let Some(pos) = raw_args.iter().position(|a| a == "--legacy-bound") {
            raw_args.remove(pos);
            true
        } else {
            false
        };
    let dump_path: Option<PathBuf> = raw_args
        .iter()
        .position(|a| a.starts_with("--dump"))
        .and_then(|pos| {
            let arg = raw_args.remove(pos);
            if arg == "--dump" {
                Some(PathBuf::from("-"))
            } else {
                arg.strip_prefix("--dump=").map(PathBuf::from)
            }
        });
    let mut args = raw_args.into_iter();
    let pcap_path: PathBuf = args
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("usage: dissect_pcap <capture> <manifest> [--dump[=path]] [--verbose] [--legacy-bound]"))?;
    let manifest_path: PathBuf = args
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("missing manifest path"))?;

    let src = std::fs::read_to_string(&manifest_path)?;
    let mut ctx = parse_manifest(&src)?;
    if legacy_bound {
        ctx = ctx.with_index_bound(IndexBound::Legacy);
    }

    let mut dump_writer: Option<Box<dyn Write>> = match dump_path.as_ref() {
        Some(p) if p.as_os_str() == "-" => Some(Box::new(std::io::stdout()) as Box<dyn Write>),
        Some(p) => Some(Box::new(File::create(p)?) as Box<dyn Write>),
        None => None,
    };

    let mut report = Report::default();

    // Probe file type (pcap vs pcapng) using the magic at start of file.
    let mut probe = [0u8; 4];
    {
        let mut f = File::open(&pcap_path)?;
        f.read_exact(&mut probe)?;
    }
    let file = File::open(&pcap_path)?;
    if probe == [0x0a, 0x0d, 0x0d, 0x0a] {
        run_pcapng(file, &mut ctx, verbose, &mut dump_writer, &mut report)?;
    } else {
        run_legacy_pcap(file, &mut ctx, verbose, &mut dump_writer, &mut report)?;
    }

    eprintln!("capture:  {}", pcap_path.display());
    eprintln!("manifest: {}", manifest_path.display());
    eprintln!("packets: {}", report.packets);
    eprintln!("udp payloads: {}", report.udp_payloads);
    eprintln!("subpackets decoded: {}", report.decoded);
    eprintln!("subpackets failed: {}", report.failed);
    if let Some(err) = &report.first_error {
        eprintln!("first error: {}", err);
    }

    Ok(())
}

fn run_legacy_pcap<R: Read>(
    file: R,
    ctx: &mut SessionContext,
    verbose: bool,
    dump: &mut Option<Box<dyn Write>>,
    report: &mut Report,
) -> anyhow::Result<()> {
    let mut reader = pcap_parser::pcap::LegacyPcapReader::new(1 << 20, file)?;
    let mut linktype: Option<Linktype> = None;
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                match block {
                    PcapBlockOwned::LegacyHeader(h) => linktype = Some(h.network),
                    PcapBlockOwned::Legacy(b) => {
                        report.packets += 1;
                        let lt = linktype.unwrap_or(Linktype(1));
                        if let Some(payload) = udp_payload_from_linktype(lt, b.data) {
                            process_udp_payload(ctx, payload, report.packets, verbose, dump, report);
                        }
                    }
                    PcapBlockOwned::NG(_) => {}
                }
                reader.consume(offset);
            }
            Err(PcapError::Eof) => break,
            Err(PcapError::Incomplete(_)) => {
                reader
                    .refill()
                    .map_err(|e| anyhow::anyhow!("pcap refill error: {:?}", e))?;
            }
            Err(e) => return Err(anyhow::anyhow!("pcap read error: {:?}", e)),
        }
    }
    Ok(())
}

fn run_pcapng<R: Read>(
    file: R,
    ctx: &mut SessionContext,
    verbose: bool,
    dump: &mut Option<Box<dyn Write>>,
    report: &mut Report,
) -> anyhow::Result<()> {
    let mut reader = pcap_parser::pcapng::PcapNGReader::new(1 << 20, file)?;
    let mut if_linktypes: Vec<Linktype> = Vec::new();
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                if let PcapBlockOwned::NG(b) = block {
                    match &b {
                        PcapNgBlock::InterfaceDescription(idb) => if_linktypes.push(idb.linktype),
                        PcapNgBlock::EnhancedPacket(epb) => {
                            report.packets += 1;
                            let lt = if_linktypes
                                .get(epb.if_id as usize)
                                .copied()
                                .unwrap_or(Linktype(1));
                            if let Some(payload) = udp_payload_from_linktype(lt, epb.packet_data()) {
                                process_udp_payload(ctx, payload, report.packets, verbose, dump, report);
                            }
                        }
                        PcapNgBlock::SimplePacket(spb) => {
                            report.packets += 1;
                            let lt = if_linktypes.first().copied().unwrap_or(Linktype(1));
                            if let Some(payload) = udp_payload_from_linktype(lt, spb.packet_data()) {
                                process_udp_payload(ctx, payload, report.packets, verbose, dump, report);
                            }
                        }
                        _ => {}
                    }
                }
                reader.consume(offset);
            }
            Err(PcapError::Eof) => break,
            Err(PcapError::Incomplete(_)) => {
                reader
                    .refill()
                    .map_err(|e| anyhow::anyhow!("pcapng refill error: {:?}", e))?;
            }
            Err(e) => return Err(anyhow::anyhow!("pcapng read error: {:?}", e)),
        }
    }
    Ok(())
}

fn process_udp_payload(
    ctx: &mut SessionContext,
    payload: &[u8],
    packet_index: u64,
    verbose: bool,
    dump: &mut Option<Box<dyn Write>>,
    report: &mut Report,
) {
    if payload.is_empty() {
        return;
    }
    report.udp_payloads += 1;

    let result = dissect_stream(ctx, payload);
    report.decoded += result.decoded.len() as u64;
    report.failed += result.failed.len() as u64;
    if report.first_error.is_none() {
        if let Some(f) = result.failed.first() {
            report.first_error = Some(f.reason.clone());
        }
    }

    if let Some(w) = dump.as_mut() {
        let _ = writeln!(
            w,
            "=== packet {}  udp payload {} bytes ===",
            packet_index,
            payload.len()
        );
        for d in &result.decoded {
            let (a, b) = d.byte_range;
            let _ = writeln!(w, "  bytes [{}-{}]  {}", a, b, d.ack.describe(ctx));
        }
        for f in &result.failed {
            let (a, b) = f.byte_range;
            let _ = writeln!(w, "  bytes [{}-{}]  FAILED: {}", a, b, f.reason);
            let _ = writeln!(w, "    hex: {}", hex_string(&payload[a..b]));
        }
    } else if verbose && !result.failed.is_empty() {
        for f in &result.failed {
            eprintln!("packet {}: {}", packet_index, f.reason);
        }
    }
}

fn hex_string(b: &[u8]) -> String {
    b.iter().map(|x| format!("{:02x}", x)).collect::<Vec<_>>().join(" ")
}

/// Extract UDP payload bytes from a captured frame, using linktype and
/// IPv4/UDP length fields. This avoids including Ethernet padding in short
/// frames.
fn udp_payload_from_linktype(linktype: Linktype, frame: &[u8]) -> Option<&[u8]> {
    let l3 = match linktype.0 {
        1 => ethernet_l3(frame)?,    // DLT_EN10MB
        101 => frame,                // DLT_RAW
        113 => linux_sll_l3(frame)?, // DLT_LINUX_SLL
        _ => return None,
    };
    ipv4_udp_payload(l3)
}

fn ethernet_l3(frame: &[u8]) -> Option<&[u8]> {
    if frame.len() < 14 {
        return None;
    }
    let mut off = 12usize;
    let mut ethertype = u16::from_be_bytes([frame[off], frame[off + 1]]);
    off += 2;
    // VLAN tags (802.1Q / 802.1ad): skip tag and read the inner ethertype.
    while ethertype == 0x8100 || ethertype == 0x88a8 {
        if frame.len() < off + 4 + 2 {
            return None;
        }
        off += 4;
        ethertype = u16::from_be_bytes([frame[off], frame[off + 1]]);
        off += 2;
    }
    match ethertype {
        0x0800 => Some(&frame[off..]), // IPv4
        _ => None,
    }
}

fn linux_sll_l3(frame: &[u8]) -> Option<&[u8]> {
    // Linux cooked capture v1 (SLL): 16-byte header, protocol at bytes 14..16
    if frame.len() < 16 {
        return None;
    }
    let proto = u16::from_be_bytes([frame[14], frame[15]]);
    match proto {
        0x0800 => Some(&frame[16..]), // IPv4
        _ => None,
    }
}

fn ipv4_udp_payload(l3: &[u8]) -> Option<&[u8]> {
    if l3.len() < 20 {
        return None;
    }
    let ver_ihl = l3[0];
    if (ver_ihl >> 4) != 4 {
        return None;
    }
    let ihl = (ver_ihl & 0x0f) as usize * 4;
    if ihl < 20 || l3.len() < ihl {
        return None;
    }
    let total_len = u16::from_be_bytes([l3[2], l3[3]]) as usize;
    if total_len < ihl {
        return None;
    }
    let l3_trunc = if total_len <= l3.len() { &l3[..total_len] } else { l3 };
    if l3_trunc.len() < ihl + 8 {
        return None;
    }
    if l3_trunc[9] != 17 {
        return None; // not UDP
    }
    let udp = &l3_trunc[ihl..];
    if udp.len() < 8 {
        return None;
    }
    let udp_len = u16::from_be_bytes([udp[4], udp[5]]) as usize;
    if udp_len < 8 || udp.len() < udp_len {
        return None;
    }
    Some(&udp[8..udp_len])
}
