// ABOUTME: Integration tests over a realistic synthetic device tree
// ABOUTME: Validates walking, classification and rendering end to end

use crate::devtree::{DeviceTreeParser, NodeEntry, PropertyEntry, Visitor, iterate};
use crate::test_utils::NodeBuilder;
use crate::value::{DisplayKind, classify};
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::ops::ControlFlow;

fn address_pairs(pairs: &[(u64, u64)]) -> Vec<u8> {
    let mut value = Vec::new();
    for &(address, size) in pairs {
        value.extend_from_slice(&address.to_le_bytes());
        value.extend_from_slice(&size.to_le_bytes());
    }
    value
}

fn segment(phys: u64, virt: u64, remap: u64, size: u32, flags: u32) -> Vec<u8> {
    let mut value = Vec::new();
    value.extend_from_slice(&phys.to_le_bytes());
    value.extend_from_slice(&virt.to_le_bytes());
    value.extend_from_slice(&remap.to_le_bytes());
    value.extend_from_slice(&size.to_le_bytes());
    value.extend_from_slice(&flags.to_le_bytes());
    value
}

/// A phone-like tree covering every display kind
fn phone_tree() -> NodeBuilder {
    let mut function = 0x6fu32.to_le_bytes().to_vec();
    function.extend_from_slice(b"GPIo");
    function.extend_from_slice(&0x2u32.to_le_bytes());

    let mut serial = b"C39VX0Q1JCLJ".to_vec();
    serial.extend_from_slice(&[0xff, 0x00, 0x01]);

    NodeBuilder::named("device-tree")
        .string_property("compatible", "D10AP\0iPhone9,1\0AppleARM")
        .string_property("model", "iPhone9,1")
        .u32_property("#address-cells", 2)
        .u32_property("#size-cells", 2)
        .child(
            NodeBuilder::named("chosen")
                .u64_property("dram-base", 0x8_0000_0000)
                .property("memory-map-region", &address_pairs(&[(0x8_0100_0000, 0x20_0000)]))
                .substituted_property("mac-address-wifi0", &[0x00, 0x1c, 0xb3, 0x09, 0x85, 0x15])
                .property("debug-enabled", b""),
        )
        .child(
            NodeBuilder::named("arm-io")
                .property("segment-ranges", &segment(0x2_0000_0000, 0xffff_fff0_0000_0000, 0, 0x4000, 1))
                .child(
                    NodeBuilder::named("gpio")
                        .property("reg", &address_pairs(&[(0x2_0f10_0000, 0x10_0000)]))
                        .u32_property("#gpio-pins", 208)
                        .property("serial-number", &serial),
                )
                .child(
                    NodeBuilder::named("wlan")
                        .property("function-power", &function)
                        .property("checksum", &[0xa5, 0x5a, 0x00]),
                ),
        )
}

/// Collects (depth, name, kind) for every non-empty property
#[derive(Default)]
struct KindCollector {
    nodes: usize,
    properties: Vec<(u32, String, Option<DisplayKind>)>,
}

impl<'a> Visitor<'a> for KindCollector {
    fn visit_node(&mut self, _node: &NodeEntry<'a>) -> ControlFlow<()> {
        self.nodes += 1;
        ControlFlow::Continue(())
    }

    fn visit_property(&mut self, property: &PropertyEntry<'a>) -> ControlFlow<()> {
        let kind = (!property.value.is_empty())
            .then(|| classify(property.name.as_bytes(), property.value));
        self.properties
            .push((property.depth, property.name.to_string(), kind));
        ControlFlow::Continue(())
    }
}

#[test]
fn test_phone_tree_walk_consumes_everything() {
    let tree = phone_tree();
    let data = tree.encode();

    let mut collector = KindCollector::default();
    let traversal = iterate(&data, &mut collector).unwrap();

    assert_eq!(traversal.consumed, data.len());
    assert!(!traversal.stopped);
    assert_eq!(collector.nodes, tree.node_count());
    assert_eq!(collector.properties.len(), tree.property_count());
}

#[test]
fn test_phone_tree_display_kinds() {
    let data = phone_tree().encode();
    let mut collector = KindCollector::default();
    iterate(&data, &mut collector).unwrap();

    let kind_of = |name: &str| {
        collector
            .properties
            .iter()
            .find(|(_, n, _)| n == name)
            .map(|(_, _, kind)| *kind)
            .expect("property present")
    };

    assert_eq!(kind_of("model"), Some(DisplayKind::PrintableString));
    assert_eq!(kind_of("compatible"), Some(DisplayKind::QuotedHexString));
    assert_eq!(kind_of("#size-cells"), Some(DisplayKind::DecimalInteger));
    assert_eq!(kind_of("dram-base"), Some(DisplayKind::SmallHexInteger));
    assert_eq!(kind_of("memory-map-region"), Some(DisplayKind::AddressRangeTable));
    assert_eq!(kind_of("mac-address-wifi0"), Some(DisplayKind::RawHexDump));
    assert_eq!(kind_of("debug-enabled"), None);
    assert_eq!(kind_of("segment-ranges"), Some(DisplayKind::SegmentRangeTable));
    assert_eq!(kind_of("reg"), Some(DisplayKind::AddressRangeTable));
    assert_eq!(kind_of("serial-number"), Some(DisplayKind::QuotedHexString));
    assert_eq!(kind_of("function-power"), Some(DisplayKind::FunctionDescriptor));
    assert_eq!(kind_of("checksum"), Some(DisplayKind::RawHexDump));
}

#[test]
fn test_phone_tree_property_depths() {
    let data = phone_tree().encode();
    let mut collector = KindCollector::default();
    iterate(&data, &mut collector).unwrap();

    let depth_of = |name: &str| {
        collector
            .properties
            .iter()
            .find(|(_, n, _)| n == name)
            .map(|(depth, _, _)| *depth)
    };
    assert_eq!(depth_of("model"), Some(1));
    assert_eq!(depth_of("dram-base"), Some(2));
    assert_eq!(depth_of("function-power"), Some(3));
}

#[test]
fn test_every_truncation_fails() {
    let data = phone_tree().encode_without_trailing_padding();
    for cut in 0..data.len() {
        assert!(
            iterate(&data[..cut], ()).is_err(),
            "truncation at {cut} of {} should fail",
            data.len()
        );
    }
    assert_eq!(iterate(&data, ()).unwrap().consumed, data.len());
}

#[test]
fn test_substitution_flag_is_masked() {
    let data = phone_tree().encode();
    let parser = DeviceTreeParser::new(&data);
    let root = parser.parse_tree().unwrap();

    let chosen = root.find_node("/chosen").unwrap();
    let mac = chosen.find_property("mac-address-wifi0").unwrap();
    assert!(mac.needs_substitution);
    assert_eq!(mac.size(), 6);
    assert!(!chosen["dram-base"].needs_substitution);
}

#[test]
fn test_scan_never_reports_child_properties() {
    let data = phone_tree().encode();
    let root = DeviceTreeParser::new(&data).parse_tree().unwrap();

    for node in root.iter_nodes() {
        let mut scanned = Vec::new();
        crate::devtree::scan_immediate_properties(&data[node.offset..], |property| {
            scanned.push(*property);
            ControlFlow::Continue(())
        })
        .unwrap();

        let own: Vec<_> = node.iter_properties().map(|p| (p.name, p.value)).collect();
        let seen: Vec<_> = scanned.iter().map(|p| (p.name, p.value)).collect();
        assert_eq!(own, seen, "node at offset {}", node.offset);
    }
}

#[test]
fn test_tree_queries() {
    let data = phone_tree().encode();
    let parser = DeviceTreeParser::new(&data);
    let root = parser.parse_tree().unwrap();

    assert_eq!(root.prop_str("model"), Some("iPhone9,1"));
    assert_eq!(root.find_compatible_nodes("iPhone9,1").len(), 1);
    assert_eq!(root.find_nodes_with_property("reg").len(), 1);
    assert_eq!(
        root.find_node("/arm-io/gpio").and_then(|n| n.prop_u32("#gpio-pins")),
        Some(208)
    );

    let names: Vec<_> = root.iter_nodes().filter_map(|n| n.name()).collect();
    assert_eq!(names, ["device-tree", "chosen", "arm-io", "gpio", "wlan"]);
}
