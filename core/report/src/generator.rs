//! PDF profile report rendering.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream;
use printpdf::{
    BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference,
};
use tracing::info;

use docuvault_common::{Error, MemberId, Result};
use docuvault_records::{Database, DocumentRecord, DocumentStore, MemberRecord, MemberRegistry};
use docuvault_storage::{ByteStream, FileVault};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_LEFT_MM: f32 = 20.0;
const MARGIN_TOP_MM: f32 = 277.0;
const MARGIN_BOTTOM_MM: f32 = 25.0;

/// Chunk size for streaming the rendered report out.
const STREAM_CHUNK_BYTES: usize = 16 * 1024;

/// Renders member profile reports from the record store.
#[derive(Clone)]
pub struct ReportGenerator {
    registry: MemberRegistry,
    documents: DocumentStore,
}

impl ReportGenerator {
    pub fn new(db: Arc<Database>, vault: Arc<FileVault>) -> Self {
        Self {
            registry: MemberRegistry::new(db.clone()),
            documents: DocumentStore::new(db, vault),
        }
    }

    /// Render the profile report for one member.
    ///
    /// # Errors
    /// - `NotFound` if the member does not exist.
    /// - `Render` if PDF assembly fails.
    pub fn generate(&self, member_id: MemberId) -> Result<Vec<u8>> {
        let member = self.registry.get(member_id)?;
        let documents = self.documents.list_for_member(member_id)?;

        let bytes = render_profile(&member, &documents)?;
        info!(member = %member_id, documents = documents.len(), size = bytes.len(),
            "Profile report rendered");
        Ok(bytes)
    }

    /// Render and hand the report out as a bounded-chunk stream.
    pub fn stream(&self, member_id: MemberId) -> Result<ByteStream> {
        let bytes = self.generate(member_id)?;
        let chunks: Vec<Result<Bytes>> = bytes
            .chunks(STREAM_CHUNK_BYTES)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}

/// Fixed-layout renderer. One A4 page flow; a fresh page starts whenever
/// the cursor would cross the bottom margin.
fn render_profile(member: &MemberRecord, documents: &[DocumentRecord]) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "Member Profile",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "profile",
    );
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(render_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(render_err)?;

    let mut writer = PageWriter {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        y: MARGIN_TOP_MM,
    };

    // Title block.
    writer.text_at("Member Profile", 24.0, &bold, 72.0);
    writer.advance(8.0);
    writer.text_at(
        &format!("Generated: {}", format_date(&Utc::now())),
        10.0,
        &regular,
        85.0,
    );
    writer.advance(16.0);

    // Personal information.
    writer.text_at("Personal Information", 16.0, &bold, MARGIN_LEFT_MM);
    writer.advance(8.0);

    let rows = [
        ("Name:", display(&member.name)),
        ("Email:", display(&member.email)),
        ("Phone:", display(&member.phone)),
        ("Address:", display(&member.address)),
        ("PAN Number:", display(&member.pan_number)),
        ("Citizenship Number:", display(&member.citizenship_number)),
        ("National ID:", display(&member.nid_number)),
        ("Member Since:", format_date(&member.created_at)),
    ];
    for (label, value) in rows {
        writer.text_at(label, 11.0, &bold, MARGIN_LEFT_MM);
        writer.text_at(&value, 11.0, &regular, 70.0);
        writer.advance(6.0);
    }
    writer.advance(10.0);

    // Documents section.
    writer.text_at("Documents", 16.0, &bold, MARGIN_LEFT_MM);
    writer.advance(8.0);

    if documents.is_empty() {
        writer.text_at("No documents uploaded", 11.0, &regular, MARGIN_LEFT_MM);
        writer.advance(6.0);
    } else {
        for (index, document) in documents.iter().enumerate() {
            writer.text_at(
                &format!("{}. {}", index + 1, document.doc_type),
                11.0,
                &bold,
                MARGIN_LEFT_MM,
            );
            writer.text_at(
                &format!("- Uploaded: {}", format_date(&document.created_at)),
                11.0,
                &regular,
                70.0,
            );
            writer.advance(6.0);
        }
    }

    // Disclaimer footer.
    writer.advance(14.0);
    writer.text_at(
        "This is a computer-generated document.",
        8.0,
        &regular,
        78.0,
    );

    doc.save_to_bytes().map_err(render_err)
}

struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PageWriter<'_> {
    fn text_at(&self, text: &str, size: f32, font: &IndirectFontRef, x: f32) {
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn advance(&mut self, dy: f32) {
        self.y -= dy;
        if self.y < MARGIN_BOTTOM_MM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "profile");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = MARGIN_TOP_MM;
        }
    }
}

fn display(value: &Option<String>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.clone(),
        _ => "N/A".to_string(),
    }
}

fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

fn render_err(e: impl std::fmt::Display) -> Error {
    Error::Render(e.to_string())
}
