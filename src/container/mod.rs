/*!
 * Container codec for zip-packaged documents.
 *
 * - `codec`: reads an archive into an ordered list of named parts and
 *   writes a fresh archive from parts.
 * - `rebuild`: replaces selected parts inside the original archive while
 *   copying every other entry through untouched.
 * - `content_types`: locates the text-bearing WordprocessingML parts.
 */

pub mod codec;
pub mod content_types;
pub mod rebuild;

pub use codec::{Container, Part, PartData};
pub use content_types::{MAIN_DOCUMENT_PART, text_bearing_parts};
pub use rebuild::{ContainerRebuilder, RebuildOutcome};
