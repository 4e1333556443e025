pub mod note;

pub use note::{
    AttachmentPayload, NewNote, Note, NoteAttachment, NoteChanges, NoteForm, NoteView,
    UploadedFile,
};
