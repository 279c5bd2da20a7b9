//! PDF page accumulation and merging using lopdf

use std::collections::BTreeMap;
use std::path::PathBuf;
use lopdf::{Dictionary, Document, Object, ObjectId};
use crate::error::{Error, Result};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Options for merging PDFs
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Input PDF file paths in the order they should be merged
    pub input_paths: Vec<PathBuf>,
    /// Output PDF file path
    pub output_path: PathBuf,
}

/// Collects pages from several documents into one
///
/// Based on the lopdf merge example:
/// https://github.com/J-F-Liu/lopdf/blob/main/examples/merge.rs
///
/// Objects from every appended document are renumbered above the ones
/// already collected, so references never collide. Page order is append order.
#[derive(Debug)]
pub struct PageCollector {
    max_id: u32,
    page_ids: Vec<ObjectId>,
    objects: BTreeMap<ObjectId, Object>,
}

impl PageCollector {
    pub fn new() -> Self {
        Self {
            max_id: 1,
            page_ids: Vec::new(),
            objects: BTreeMap::new(),
        }
    }

    /// Number of pages collected so far
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Append every page of `doc`, in order. Returns the number of pages added.
    pub fn append(&mut self, mut doc: Document) -> Result<usize> {
        // Renumber objects in this document to avoid conflicts
        doc.renumber_objects_with(self.max_id);
        self.max_id = doc.max_id + 1;

        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

        // Pages are about to lose their parent, so pull inherited attributes down first
        for &page_id in &pages {
            materialize_inherited(&mut doc, page_id)?;
        }

        self.page_ids.extend(pages.iter().copied());
        self.objects.extend(doc.objects);

        Ok(pages.len())
    }

    /// Build the merged document with a fresh catalog and page tree
    pub fn finish(self) -> Result<Document> {
        if self.page_ids.is_empty() {
            return Err(Error::NoPages);
        }

        let mut merged_doc = Document::with_version("1.5");

        // Add all collected objects FIRST
        merged_doc.objects.extend(self.objects);

        // new_object_id() must hand out IDs above everything just added
        merged_doc.max_id = self.max_id - 1;

        let pages_id = merged_doc.new_object_id();

        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|&id| Object::Reference(id))
            .collect();

        let mut pages_object = Dictionary::new();
        pages_object.set("Type", Object::Name(b"Pages".to_vec()));
        pages_object.set("Count", Object::Integer(self.page_ids.len() as i64));
        pages_object.set("Kids", Object::Array(kids));

        let catalog_id = merged_doc.new_object_id();
        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(pages_id));

        merged_doc.objects.insert(catalog_id, Object::Dictionary(catalog));
        merged_doc.objects.insert(pages_id, Object::Dictionary(pages_object));
        merged_doc.trailer.set("Root", Object::Reference(catalog_id));

        for &page_id in &self.page_ids {
            if let Ok(Object::Dictionary(dict)) = merged_doc.get_object_mut(page_id) {
                dict.set("Parent", Object::Reference(pages_id));
            }
        }

        // Old catalogs and page tree nodes are now unreachable
        merged_doc.prune_objects();

        Ok(merged_doc)
    }
}

impl Default for PageCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy attributes a page inherits from its ancestors onto the page itself
fn materialize_inherited(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let mut inherited: Vec<(&'static [u8], Object)> = Vec::new();

    {
        let page = doc.get_object(page_id)?.as_dict()?;
        let mut missing: Vec<&[u8]> = INHERITABLE
            .iter()
            .copied()
            .filter(|key| !page.has(key))
            .collect();

        let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
        // Bounded walk, malformed trees can contain parent cycles
        let mut depth = 0;
        while let Some(parent_id) = parent {
            if missing.is_empty() || depth > 64 {
                break;
            }
            let node = match doc.get_object(parent_id).and_then(Object::as_dict) {
                Ok(node) => node,
                Err(_) => break,
            };
            missing.retain(|&key| match node.get(key) {
                Ok(value) => {
                    inherited.push((key, value.clone()));
                    false
                }
                Err(_) => true,
            });
            parent = node.get(b"Parent").and_then(Object::as_reference).ok();
            depth += 1;
        }
    }

    if inherited.is_empty() {
        return Ok(());
    }

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    for (key, value) in inherited {
        page.set(key.to_vec(), value);
    }
    Ok(())
}

/// Merge multiple PDF files into a single PDF
///
/// # Example
///
/// ```no_run
/// use output_compiler::pdf::{MergeOptions, merge_pdfs};
/// use std::path::PathBuf;
///
/// let options = MergeOptions {
///     input_paths: vec![
///         PathBuf::from("1. first.pdf"),
///         PathBuf::from("2. second.pdf"),
///     ],
///     output_path: PathBuf::from("merged.pdf"),
/// };
///
/// merge_pdfs(&options).expect("Failed to merge");
/// ```
pub fn merge_pdfs(options: &MergeOptions) -> Result<usize> {
    if options.input_paths.is_empty() {
        return Err(Error::NoInputFiles);
    }

    // Validate all input files exist
    for path in &options.input_paths {
        if !path.exists() {
            return Err(Error::FileNotFound(path.clone()));
        }
    }

    let mut collector = PageCollector::new();
    for path in &options.input_paths {
        let doc = Document::load(path)?;
        let added = collector.append(doc)?;
        if added == 0 {
            return Err(Error::EmptyPdf(path.clone()));
        }
        log::debug!("{}: {} page(s)", path.display(), added);
    }

    let pages = collector.page_count();
    let mut merged_doc = collector.finish()?;
    merged_doc.compress();
    merged_doc.save(&options.output_path)?;

    Ok(pages)
}
