// blinx extractor
// Pulls chunk meshes (vertices, textured triangle strips, texture
// coordinates) out of an executable image and writes them as Wavefront OBJ.
//
// Decode order per chunk: pointer block -> vertex array -> tripart stream.

pub mod address;
pub mod chunk;
pub mod cursor;
pub mod error;
pub mod extract;
pub mod manifest;
pub mod obj;
pub mod settings;
pub mod texlist;
pub mod transform;
pub mod tripart;

pub use address::SectionTable;
pub use chunk::{Chunk, ChunkHeader, DecodeOptions, PointerBlock};
pub use cursor::StreamCursor;
pub use error::{ExtractError, ExtractResult};
pub use obj::ObjWriter;
pub use texlist::MaterialList;
pub use transform::{Translation, Vec3, WorldTransform};
pub use tripart::{Strip, StripPoint, TerminalPredicate, Tripart, TripartRecord};
