use actix_multipart::Multipart;
use actix_web::web::{block, Data, Json};
use bytes::BytesMut;
use futures_util::TryStreamExt;
use serde::Serialize;

use crate::config::Config;
use crate::error::Error;
use crate::storer::FileStorer;

const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub url: String,
}

// Relays a CV to local storage and hands back the URL the submission form
// should put in cvUrl. Only the first file field counts.
pub async fn create<S>(
    mut payload: Multipart,
    storer: Data<S>,
    config: Data<Config>,
) -> Result<Json<UploadResponse>, Error>
where
    S: FileStorer + Clone + Send + 'static,
{
    while let Some(mut field) = payload.try_next().await? {
        let Some(name) = field.content_disposition().get_filename().map(str::to_string) else {
            continue;
        };
        let mut content = BytesMut::new();
        while let Some(chunk) = field.try_next().await? {
            if content.len() + chunk.len() > MAX_UPLOAD_BYTES {
                return Err(Error::Validation("file exceeds the 10 MiB upload limit".into()));
            }
            content.extend_from_slice(&chunk);
        }
        let storer = storer.get_ref().clone();
        let key = block(move || storer.write(&name, &content.freeze())).await??;
        let url = match &config.public_base_url {
            Some(base) => format!("{}/uploads/{}", base, key),
            None => format!("/uploads/{}", key),
        };
        return Ok(Json(UploadResponse { ok: true, url }));
    }
    Err(Error::Validation("no file field in upload".into()))
}
