//! Page tree operations for the accumulator document.
//!
//! Members are appended as flat runs of pages under a single Pages node.
//! Because a member's own page-tree nodes are not carried over, attributes a
//! page inherits from them (`Resources`, `MediaBox`, `CropBox`, `Rotate`) are
//! copied onto the page itself first.

use lopdf::{Document, Object, ObjectId, dictionary};
use std::collections::BTreeSet;

/// Page attributes that may be inherited from ancestor page-tree nodes.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Upper bound on page-tree depth when looking up inherited attributes.
const MAX_TREE_DEPTH: usize = 256;

/// The in-progress merged document.
#[derive(Debug)]
pub struct Accumulator {
    document: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
}

impl Accumulator {
    /// Create an empty accumulator with a Catalog and an empty Pages node.
    pub fn new() -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Self {
            document,
            pages_id,
            page_ids: Vec::new(),
        }
    }

    /// Pages appended so far.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Append every page of `member`, in its page-tree order, at the end.
    ///
    /// Returns the number of pages appended.
    ///
    /// # Errors
    ///
    /// Returns an error if a page or the accumulator's Pages node is not a
    /// dictionary.
    pub fn append(&mut self, mut member: Document) -> lopdf::Result<usize> {
        member.renumber_objects_with(self.document.max_id + 1);

        let pages: Vec<ObjectId> = member.page_iter().collect();
        let skipped = structural_objects(&member);

        for &page_id in &pages {
            let inherited = inherited_attributes(&member, page_id);
            let page = member.get_dictionary_mut(page_id)?;
            for (key, value) in inherited {
                page.set(key, value);
            }
            page.set("Parent", self.pages_id);
        }

        let member_max_id = member.max_id;
        for (id, object) in member.objects {
            if !skipped.contains(&id) {
                self.document.objects.insert(id, object);
            }
        }
        self.document.max_id = self.document.max_id.max(member_max_id);

        self.page_ids.extend_from_slice(&pages);

        let node = self.document.get_dictionary_mut(self.pages_id)?;
        node.set(
            "Kids",
            self.page_ids
                .iter()
                .map(|&id| Object::Reference(id))
                .collect::<Vec<Object>>(),
        );
        node.set("Count", self.page_ids.len() as i64);

        Ok(pages.len())
    }

    /// Finish accumulating and hand out the document.
    pub fn into_document(self) -> Document {
        self.document
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Catalog and page-tree nodes of a member, which the accumulator replaces.
fn structural_objects(doc: &Document) -> BTreeSet<ObjectId> {
    let mut ids: BTreeSet<ObjectId> = doc
        .objects
        .iter()
        .filter(|(_, object)| {
            object
                .as_dict()
                .is_ok_and(|dict| dict.has_type(b"Pages") || dict.has_type(b"Catalog"))
        })
        .map(|(&id, _)| id)
        .collect();

    if let Ok(root) = doc.trailer.get(b"Root").and_then(Object::as_reference) {
        ids.insert(root);
    }

    ids
}

/// Inheritable attributes a page lacks, resolved from its nearest ancestors.
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };

    let mut missing: Vec<&'static [u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut found = Vec::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(id) = parent {
        if missing.is_empty() || depth >= MAX_TREE_DEPTH {
            break;
        }
        let Ok(node) = doc.get_dictionary(id) else {
            break;
        };

        missing.retain(|&key| match node.get(key) {
            Ok(value) => {
                found.push((key, value.clone()));
                false
            }
            Err(_) => true,
        });

        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    found
}
