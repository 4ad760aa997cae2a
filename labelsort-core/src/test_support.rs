//! Builders for small label PDFs used by unit tests

use lopdf::{dictionary, Document, Object, Stream};

/// One text run: `(x, y, text)` in PDF user space
pub(crate) type TextRun<'a> = (f64, f64, &'a str);

/// Content stream showing each run in 10pt Courier
pub(crate) fn text_content(runs: &[TextRun]) -> String {
    runs.iter()
        .map(|(x, y, text)| format!("BT /F1 10 Tf {x} {y} Td ({text}) Tj ET\n"))
        .collect()
}

/// A document whose pages share one Courier font and one MediaBox
pub(crate) fn build_pdf(media_box: [i64; 4], pages: &[String], title: Option<&str>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = pages
        .iter()
        .map(|content| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            Object::Reference(page_id)
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => pages.len() as i64,
            "Kids" => kids,
            "Resources" => resources_id,
            "MediaBox" => media_box.iter().map(|&v| Object::Integer(v)).collect::<Vec<_>>(),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
        });
        doc.trailer.set("Info", info_id);
    }

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Letter-size label pages with one line of text each
pub(crate) fn label_pdf(texts: &[&str]) -> Vec<u8> {
    let pages: Vec<String> = texts
        .iter()
        .map(|&text| text_content(&[(72.0, 720.0, text)]))
        .collect();
    build_pdf([0, 0, 612, 792], &pages, None)
}
