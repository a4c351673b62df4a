// vim: tw=80
//! The disks attached to a domain, as described by its XML
//!
//! https://libvirt.org/formatdomain.html#hard-drives-floppy-disks-cdroms

use serde_derive::Deserialize;

use crate::Result;

/// Identifies one block device attached to a domain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiskDescriptor {
    /// Target device name inside the guest, like "vda".  libvirt keys block
    /// statistics by this name.
    pub name: String,
    pub bus: String,
    pub serial: Option<String>,
}

impl DiskDescriptor {
    pub fn new(name: &str, bus: &str, serial: Option<&str>) -> Self {
        DiskDescriptor {
            name: name.to_string(),
            bus: bus.to_string(),
            serial: serial.map(str::to_string),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DomainXml {
    #[serde(default)]
    devices: DevicesXml,
}

#[derive(Debug, Default, Deserialize)]
struct DevicesXml {
    #[serde(rename = "disk", default)]
    disks: Vec<DiskXml>,
}

#[derive(Debug, Deserialize)]
struct DiskXml {
    target: Option<TargetXml>,
    serial: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TargetXml {
    #[serde(rename = "@dev")]
    dev: String,
    #[serde(rename = "@bus", default)]
    bus: String,
}

/// List the disks in a domain's XML description, in document order.
///
/// Disks without a `<target>` cannot be queried for statistics, so they are
/// skipped.
pub fn parse_domain_xml(xml: &str) -> Result<Vec<DiskDescriptor>> {
    let domain: DomainXml = quick_xml::de::from_str(xml)?;
    let disks = domain.devices.disks
        .into_iter()
        .filter_map(|disk| {
            let target = disk.target?;
            let serial = disk.serial
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            Some(DiskDescriptor {
                name: target.dev,
                bus: target.bus,
                serial,
            })
        }).collect();
    Ok(disks)
}

#[cfg(test)]
mod t {
    use super::*;

    const DOMAIN: &str = r#"
<domain type='kvm' id='7'>
  <name>web01</name>
  <uuid>4dea22b3-1d52-d8f3-2516-782e98ab3fa0</uuid>
  <memory unit='KiB'>1048576</memory>
  <devices>
    <emulator>/usr/bin/qemu-system-x86_64</emulator>
    <disk type='file' device='disk'>
      <driver name='qemu' type='qcow2'/>
      <source file='/var/lib/libvirt/images/web01.qcow2'/>
      <target dev='vda' bus='virtio'/>
      <serial>serial-xyz</serial>
      <address type='pci' domain='0x0000' bus='0x00' slot='0x07' function='0x0'/>
    </disk>
    <interface type='network'>
      <source network='default'/>
      <model type='virtio'/>
    </interface>
    <disk type='block' device='disk'>
      <driver name='qemu' type='raw'/>
      <source dev='/dev/vg0/web01-data'/>
      <target dev='vdb' bus='virtio'/>
    </disk>
    <console type='pty'/>
    <disk type='file' device='cdrom'>
      <target dev='sda' bus='sata'/>
      <readonly/>
    </disk>
  </devices>
</domain>
"#;

    #[test]
    fn interleaved_devices() {
        let disks = parse_domain_xml(DOMAIN).unwrap();
        assert_eq!(disks, vec![
            DiskDescriptor::new("vda", "virtio", Some("serial-xyz")),
            DiskDescriptor::new("vdb", "virtio", None),
            DiskDescriptor::new("sda", "sata", None),
        ]);
    }

    #[test]
    fn no_devices() {
        let xml = "<domain type='kvm'><name>empty</name></domain>";
        assert!(parse_domain_xml(xml).unwrap().is_empty());
    }

    #[test]
    fn no_disks() {
        let xml = "<domain><devices><console type='pty'/></devices></domain>";
        assert!(parse_domain_xml(xml).unwrap().is_empty());
    }

    #[test]
    fn disk_without_target() {
        let xml = "<domain><devices>\
            <disk type='file' device='floppy'/>\
            <disk type='file' device='disk'><target dev='hda'/></disk>\
            </devices></domain>";
        let disks = parse_domain_xml(xml).unwrap();
        assert_eq!(disks, vec![DiskDescriptor::new("hda", "", None)]);
    }

    #[test]
    fn blank_serial() {
        let xml = "<domain><devices><disk>\
            <target dev='vdc' bus='scsi'/><serial>  </serial>\
            </disk></devices></domain>";
        let disks = parse_domain_xml(xml).unwrap();
        assert_eq!(disks[0].serial, None);
    }

    #[test]
    fn malformed() {
        let e = parse_domain_xml("<domain><devices><disk>").unwrap_err();
        assert!(matches!(e, crate::Error::Inventory(_)));
    }
}
