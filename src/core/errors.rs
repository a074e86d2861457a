use thiserror::Error;

#[derive(Error, Debug)]
pub enum TarologueError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Sqlite(Box<rusqlite::Error>),

    #[error("Image error: {0}")]
    Image(Box<image::ImageError>),

    #[error("Folder not found or not a directory: {0}")]
    FolderNotFound(String),

    #[error("Deck name required")]
    MissingDeckName,

    #[error("Cartomancy type required")]
    MissingCartomancyType,

    #[error("TarologueError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for TarologueError {
    fn from(error: std::io::Error) -> Self {
        TarologueError::Io(Box::new(error))
    }
}

impl From<rusqlite::Error> for TarologueError {
    fn from(error: rusqlite::Error) -> Self {
        TarologueError::Sqlite(Box::new(error))
    }
}

impl From<image::ImageError> for TarologueError {
    fn from(error: image::ImageError) -> Self {
        TarologueError::Image(Box::new(error))
    }
}
