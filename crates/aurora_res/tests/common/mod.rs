//! Fixture builders shared by the integration tests.
#![allow(dead_code)]

use flate2::{write::DeflateEncoder, Compression};
use std::io::Write;

/// A minimal GFF emitter, enough to author module IFO files.
#[derive(Default)]
pub struct GffEmitter {
    structs: Vec<(u32, Vec<u32>)>,
    fields: Vec<(u32, u32, u32)>,
    labels: Vec<[u8; 16]>,
    field_data: Vec<u8>,
    list_data: Vec<u8>,
    file_type: Option<[u8; 4]>,
}

impl GffEmitter {
    pub fn new(file_type: &[u8; 4]) -> GffEmitter {
        GffEmitter {
            file_type: Some(*file_type),
            ..Default::default()
        }
    }

    pub fn add_struct(&mut self, type_tag: u32) -> u32 {
        self.structs.push((type_tag, Vec::new()));
        (self.structs.len() - 1) as u32
    }

    fn label(&mut self, name: &str) -> u32 {
        let mut raw = [0u8; 16];
        raw[..name.len()].copy_from_slice(name.as_bytes());
        if let Some(i) = self.labels.iter().position(|l| *l == raw) {
            return i as u32;
        }
        self.labels.push(raw);
        (self.labels.len() - 1) as u32
    }

    fn add_field(&mut self, s: u32, type_tag: u32, name: &str, data: u32) {
        let label = self.label(name);
        self.fields.push((type_tag, label, data));
        let index = (self.fields.len() - 1) as u32;
        self.structs[s as usize].1.push(index);
    }

    pub fn add_cexostring(&mut self, s: u32, name: &str, value: &str) {
        let offset = self.field_data.len() as u32;
        self.field_data
            .extend_from_slice(&(value.len() as u32).to_le_bytes());
        self.field_data.extend_from_slice(value.as_bytes());
        self.add_field(s, 10, name, offset);
    }

    pub fn add_list(&mut self, s: u32, name: &str, elements: &[u32]) {
        let offset = self.list_data.len() as u32;
        self.list_data
            .extend_from_slice(&(elements.len() as u32).to_le_bytes());
        for e in elements {
            self.list_data.extend_from_slice(&e.to_le_bytes());
        }
        self.add_field(s, 15, name, offset);
    }

    pub fn finish(self) -> Vec<u8> {
        let mut field_idx = Vec::new();
        let mut struct_entries = Vec::new();
        for (type_tag, fields) in &self.structs {
            let (data, count) = match fields.len() {
                0 => (0, 0),
                1 => (fields[0], 1),
                n => {
                    let offset = field_idx.len() as u32;
                    for f in fields {
                        field_idx.extend_from_slice(&f.to_le_bytes());
                    }
                    (offset, n as u32)
                }
            };
            struct_entries.push((*type_tag, data, count));
        }

        let struct_off = 56u32;
        let field_off = struct_off + 12 * struct_entries.len() as u32;
        let label_off = field_off + 12 * self.fields.len() as u32;
        let fidx_off = label_off + 16 * self.labels.len() as u32;
        let lidx_off = fidx_off + field_idx.len() as u32;
        let data_off = lidx_off + self.list_data.len() as u32;

        let mut out = Vec::new();
        out.extend_from_slice(&self.file_type.unwrap_or(*b"GFF "));
        out.extend_from_slice(b"V3.2");
        for (offset, count) in [
            (struct_off, struct_entries.len() as u32),
            (field_off, self.fields.len() as u32),
            (label_off, self.labels.len() as u32),
            (data_off, self.field_data.len() as u32),
            (fidx_off, field_idx.len() as u32),
            (lidx_off, self.list_data.len() as u32),
        ] {
            out.extend_from_slice(&offset.to_le_bytes());
            out.extend_from_slice(&count.to_le_bytes());
        }
        for (t, d, c) in struct_entries {
            out.extend_from_slice(&t.to_le_bytes());
            out.extend_from_slice(&d.to_le_bytes());
            out.extend_from_slice(&c.to_le_bytes());
        }
        for (t, l, d) in &self.fields {
            out.extend_from_slice(&t.to_le_bytes());
            out.extend_from_slice(&l.to_le_bytes());
            out.extend_from_slice(&d.to_le_bytes());
        }
        for l in &self.labels {
            out.extend_from_slice(l);
        }
        out.extend_from_slice(&field_idx);
        out.extend_from_slice(&self.list_data);
        out.extend_from_slice(&self.field_data);
        out
    }
}

/// A module IFO naming `haks` and an optional custom talk table.
pub fn build_ifo(haks: &[&str], custom_tlk: Option<&str>) -> Vec<u8> {
    let mut e = GffEmitter::new(b"IFO ");
    let root = e.add_struct(0xFFFF_FFFF);

    let mut elements = Vec::new();
    for hak in haks {
        let s = e.add_struct(8);
        e.add_cexostring(s, "Mod_Hak", hak);
        elements.push(s);
    }
    e.add_list(root, "Mod_HakList", &elements);
    if let Some(tlk) = custom_tlk {
        e.add_cexostring(root, "Mod_CustomTlk", tlk);
    }
    // give the root a second field so the field-index path is exercised
    e.add_cexostring(root, "Mod_Tag", "fixture");
    e.finish()
}

/// A single-language talk table.
pub fn build_tlk(strings: &[Option<&str>]) -> Vec<u8> {
    let mut data = Vec::new();
    let mut text = Vec::new();

    data.extend_from_slice(b"TLK V3.0");
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&(strings.len() as u32).to_le_bytes());
    data.extend_from_slice(&(20 + strings.len() as u32 * 40).to_le_bytes());

    for s in strings {
        let (flags, offset, len) = match s {
            Some(s) => {
                let offset = text.len() as u32;
                text.extend_from_slice(s.as_bytes());
                (1u32, offset, s.len() as u32)
            }
            None => (0u32, 0, 0),
        };
        data.extend_from_slice(&flags.to_le_bytes());
        data.extend_from_slice(&[0u8; 16]);
        data.extend_from_slice(&[0u8; 8]);
        data.extend_from_slice(&offset.to_le_bytes());
        data.extend_from_slice(&len.to_le_bytes());
        data.extend_from_slice(&0f32.to_le_bytes());
    }

    data.extend_from_slice(&text);
    data
}

/// A KEY image naming `bifs` and cataloging `keys`.
pub fn build_key(bifs: &[&str], keys: &[(&str, u16, u32)]) -> Vec<u8> {
    let file_table_offset = 64u32;
    let names_offset = file_table_offset + 12 * bifs.len() as u32;
    let names_size: u32 = bifs.iter().map(|n| n.len() as u32).sum();
    let key_table_offset = names_offset + names_size;

    let mut data = Vec::new();
    data.extend_from_slice(b"KEY V1  ");
    data.extend_from_slice(&(bifs.len() as u32).to_le_bytes());
    data.extend_from_slice(&(keys.len() as u32).to_le_bytes());
    data.extend_from_slice(&file_table_offset.to_le_bytes());
    data.extend_from_slice(&key_table_offset.to_le_bytes());
    data.extend_from_slice(&124u32.to_le_bytes());
    data.extend_from_slice(&11u32.to_le_bytes());
    data.extend_from_slice(&[0u8; 32]);

    let mut name_cursor = names_offset;
    for name in bifs {
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(&name_cursor.to_le_bytes());
        data.extend_from_slice(&(name.len() as u16).to_le_bytes());
        data.extend_from_slice(&1u16.to_le_bytes());
        name_cursor += name.len() as u32;
    }
    for name in bifs {
        data.extend_from_slice(name.as_bytes());
    }
    for (resref, restype, resource_id) in keys {
        let mut raw = [0u8; 16];
        raw[..resref.len()].copy_from_slice(resref.as_bytes());
        data.extend_from_slice(&raw);
        data.extend_from_slice(&restype.to_le_bytes());
        data.extend_from_slice(&resource_id.to_le_bytes());
    }
    data
}

/// A BIF image with variable entries at caller-chosen offsets.
pub fn build_bif(total_size: usize, entries: &[(u32, u32, u32, u32)]) -> Vec<u8> {
    let mut data = vec![0u8; total_size];
    data[0..8].copy_from_slice(b"BIFFV1  ");
    data[8..12].copy_from_slice(&(entries.len() as u32).to_le_bytes());
    data[12..16].copy_from_slice(&0u32.to_le_bytes());
    data[16..20].copy_from_slice(&20u32.to_le_bytes());
    let mut cursor = 20;
    for (id, offset, size, restype) in entries {
        data[cursor..cursor + 4].copy_from_slice(&id.to_le_bytes());
        data[cursor + 4..cursor + 8].copy_from_slice(&offset.to_le_bytes());
        data[cursor + 8..cursor + 12].copy_from_slice(&size.to_le_bytes());
        data[cursor + 12..cursor + 16].copy_from_slice(&restype.to_le_bytes());
        cursor += 16;
    }
    data
}

/// A zip image: local headers + data, central directory, EOCD.
pub fn build_zip(members: &[(&str, &[u8], bool)]) -> Vec<u8> {
    const CRC32: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);

    let mut out = Vec::new();
    let mut central = Vec::new();

    for (name, data, deflate) in members {
        let crc = CRC32.checksum(data);
        let compressed: Vec<u8> = if *deflate {
            let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
            enc.write_all(data).unwrap();
            enc.finish().unwrap()
        } else {
            data.to_vec()
        };
        let method: u16 = if *deflate { 8 } else { 0 };
        let offset = out.len() as u32;

        out.extend_from_slice(&0x0403_4B50u32.to_le_bytes());
        out.extend_from_slice(&20u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&method.to_le_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&crc.to_le_bytes());
        out.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&compressed);

        central.extend_from_slice(&0x0201_4B50u32.to_le_bytes());
        central.extend_from_slice(&20u16.to_le_bytes());
        central.extend_from_slice(&20u16.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&method.to_le_bytes());
        central.extend_from_slice(&[0u8; 4]);
        central.extend_from_slice(&crc.to_le_bytes());
        central.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
        central.extend_from_slice(&(data.len() as u32).to_le_bytes());
        central.extend_from_slice(&(name.len() as u16).to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&0u32.to_le_bytes());
        central.extend_from_slice(&offset.to_le_bytes());
        central.extend_from_slice(name.as_bytes());
    }

    let cd_offset = out.len() as u32;
    let cd_size = central.len() as u32;
    out.extend_from_slice(&central);
    out.extend_from_slice(&0x0605_4B50u32.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&(members.len() as u16).to_le_bytes());
    out.extend_from_slice(&(members.len() as u16).to_le_bytes());
    out.extend_from_slice(&cd_size.to_le_bytes());
    out.extend_from_slice(&cd_offset.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out
}
