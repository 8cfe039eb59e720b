//! Binary table file writer shared by the unit tests, the integration tests and the benches.
#![allow(dead_code)]

const BLOCK_SIZE: usize = 2880;
const CARD_SIZE: usize = 80;

pub fn int_card(keyword: &str, value: i64) -> String {
    format!("{keyword:<8}= {value:>20}")
}

/// Quoted string card, or a logical card for `T` / `F`.
pub fn text_card(keyword: &str, value: &str) -> String {
    if value == "T" || value == "F" {
        return format!("{keyword:<8}= {value:>20}");
    }
    format!("{keyword:<8}= '{value:<8}'")
}

/// Header unit made of `cards`, optionally terminated by `END`, padded to whole blocks.
pub fn header_block(cards: &[String], with_end: bool) -> Vec<u8> {
    let mut bytes = Vec::new();
    for card in cards {
        bytes.extend_from_slice(format!("{card:<CARD_SIZE$}").as_bytes());
    }
    if with_end {
        bytes.extend_from_slice(format!("{:<CARD_SIZE$}", "END").as_bytes());
    }
    let padded = bytes.len().div_ceil(BLOCK_SIZE).max(1) * BLOCK_SIZE;
    bytes.resize(padded, b' ');
    bytes
}

pub fn tform_width(tform: &str) -> usize {
    let (repeat, code) = tform.split_at(tform.len() - 1);
    let repeat: usize = if repeat.is_empty() { 1 } else { repeat.parse().unwrap() };
    match code {
        "L" | "B" => 1,
        "I" => 2,
        "J" | "E" => 4,
        "K" | "D" => 8,
        "A" => repeat,
        // unsupported codes still get a width so the header can be written
        _ => 1,
    }
}

/// Complete single-extension table file: empty primary HDU, one binary table.
pub fn bintable_bytes(columns: &[(&str, &str)], rows: &[Vec<u8>]) -> Vec<u8> {
    let row_bytes: usize = columns.iter().map(|(_, tform)| tform_width(tform)).sum();

    let mut bytes = header_block(
        &[
            text_card("SIMPLE", "T"),
            int_card("BITPIX", 8),
            int_card("NAXIS", 0),
            text_card("EXTEND", "T"),
        ],
        true,
    );

    let mut cards = vec![
        text_card("XTENSION", "BINTABLE"),
        int_card("BITPIX", 8),
        int_card("NAXIS", 2),
        int_card("NAXIS1", row_bytes as i64),
        int_card("NAXIS2", rows.len() as i64),
        int_card("PCOUNT", 0),
        int_card("GCOUNT", 1),
        int_card("TFIELDS", columns.len() as i64),
    ];
    for (i, (name, tform)) in columns.iter().enumerate() {
        cards.push(text_card(&format!("TTYPE{}", i + 1), name));
        cards.push(text_card(&format!("TFORM{}", i + 1), tform));
    }
    bytes.extend(header_block(&cards, true));

    let mut data: Vec<u8> = rows.concat();
    let padded = data.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
    data.resize(padded, 0);
    bytes.extend(data);
    bytes
}
