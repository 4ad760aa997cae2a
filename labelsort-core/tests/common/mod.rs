//! Shared helpers for integration tests: small label PDFs built with lopdf

#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, Stream};
use std::fmt::Write;

/// A text run `(x, y, text)` in PDF user space
pub type Run = (f64, f64, String);

pub fn run(x: f64, y: f64, text: &str) -> Run {
    (x, y, text.to_string())
}

/// Pages of 10pt Courier text sharing one MediaBox
pub fn courier_pdf(media_box: [i64; 4], pages: &[Vec<Run>]) -> Vec<u8> {
    let contents: Vec<Vec<u8>> = pages
        .iter()
        .map(|runs| {
            let mut content = String::new();
            for (x, y, text) in runs {
                writeln!(content, "BT /F1 10 Tf {x} {y} Td ({text}) Tj ET").unwrap();
            }
            content.into_bytes()
        })
        .collect();

    let font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    };
    build(media_box, font, &contents)
}

/// Letter pages, one Courier line each
pub fn simple_label_pdf(texts: &[&str]) -> Vec<u8> {
    let pages: Vec<Vec<Run>> = texts.iter().map(|t| vec![run(72.0, 720.0, t)]).collect();
    courier_pdf([0, 0, 612, 792], &pages)
}

/// Letter pages whose text is drawn with a Type0 font: glyph ids are the
/// character codes shifted by 0x100 and only the ToUnicode CMap maps them back
pub fn type0_label_pdf(texts: &[&str]) -> Vec<u8> {
    let contents: Vec<Vec<u8>> = texts
        .iter()
        .map(|text| {
            let hex: String = text
                .chars()
                .map(|c| format!("{:04X}", c as u32 + 0x100))
                .collect();
            format!("BT /F1 12 Tf 72 700 Td <{hex}> Tj ET").into_bytes()
        })
        .collect();

    let to_unicode = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
1 beginbfrange
<0120> <017E> <0020>
endbfrange
endcmap
end
end"
    .to_vec();

    let font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "LabelSans",
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![Object::Dictionary(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => "LabelSans",
            "DW" => 600,
        })],
        "ToUnicode" => Object::Stream(Stream::new(dictionary! {}, to_unicode)),
    };
    build([0, 0, 612, 792], font, &contents)
}

fn build(media_box: [i64; 4], font: lopdf::Dictionary, contents: &[Vec<u8>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(font);

    let kids: Vec<Object> = contents
        .iter()
        .map(|content| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.clone()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
            });
            page_id.into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => contents.len() as i64,
            "Kids" => kids,
            "MediaBox" => media_box.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>(),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Text of every page of a PDF, in page order
pub fn page_texts(pdf: &[u8]) -> Vec<String> {
    use labelsort::PageSource;

    let doc = labelsort::LabelDocument::from_bytes(pdf).unwrap();
    (0..doc.page_count())
        .map(|i| doc.page_text(i).unwrap())
        .collect()
}
