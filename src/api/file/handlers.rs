use actix_multipart::{Field, Multipart};
use actix_web::{
    get,
    http::header::{Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue},
    post,
    web::{Data, Path, ServiceConfig},
    HttpResponse,
};
use bytes::BytesMut;
use futures_util::TryStreamExt;
use tracing::info;
use uuid::Uuid;

use crate::api::error::ServiceError;
use crate::api::identity::Identity;
use super::dto::UploadedFile;
use super::service::{FileService, IncomingFile};

const DEFAULT_FIELD: &str = "other";

fn multipart_error(err: actix_multipart::MultipartError) -> ServiceError {
    ServiceError::validation(format!("Malformed multipart body: {}", err))
}

/// Read one file part, failing as soon as it grows past `limit`
async fn read_limited(field: &mut Field, limit: usize) -> Result<BytesMut, ServiceError> {
    let mut data = BytesMut::new();
    while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
        if data.len() + chunk.len() > limit {
            return Err(ServiceError::validation(format!(
                "File exceeds maximum size of {} bytes",
                limit
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// Client file name from `filename`, falling back to the RFC 5987
/// `filename*` form. A blank name is a file input left empty.
fn client_filename(field: &Field) -> Option<String> {
    let disposition = field.content_disposition()?;
    disposition
        .get_filename()
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .or_else(|| {
            disposition
                .get_filename_ext()
                .map(|ext| String::from_utf8_lossy(&ext.value).into_owned())
        })
        .filter(|name| !name.trim().is_empty())
}

/// `attachment` disposition; names that are not plain ASCII get an
/// underscored `filename` plus the UTF-8 `filename*` form
fn attachment(name: &str) -> ContentDisposition {
    let plain = |c: char| c.is_ascii() && !c.is_ascii_control();
    let parameters = if name.chars().all(plain) {
        vec![DispositionParam::Filename(name.to_string())]
    } else {
        let fallback = name.chars().map(|c| if plain(c) { c } else { '_' }).collect();
        vec![
            DispositionParam::Filename(fallback),
            DispositionParam::FilenameExt(ExtendedValue {
                charset: Charset::Ext("UTF-8".to_string()),
                language_tag: None,
                value: name.as_bytes().to_vec(),
            }),
        ]
    };
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters,
    }
}

/// Accepts any number of named file fields. Each file is stored as soon as
/// it has been read, so a failure part way leaves the earlier files stored.
#[post("/candidate/upload")]
async fn upload_files(
    identity: Option<Identity>,
    service: Data<FileService>,
    mut payload: Multipart,
) -> Result<HttpResponse, ServiceError> {
    let mut uploaded = Vec::new();

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let Some(original_name) = client_filename(&field) else {
            // Plain form values and empty file inputs carry no file
            while field.try_next().await.map_err(multipart_error)?.is_some() {}
            continue;
        };

        let field_name = field
            .name()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_FIELD)
            .to_string();
        let content_type = field.content_type().map(|m| m.to_string());
        let data = read_limited(&mut field, service.max_upload_size()).await?;

        let record = service
            .store(
                identity.as_ref(),
                IncomingFile {
                    field: field_name,
                    original_name,
                    content_type,
                    data: data.freeze(),
                },
            )
            .await?;
        uploaded.push(UploadedFile::from(record));
    }

    if uploaded.is_empty() {
        return Err(ServiceError::validation("No files uploaded"));
    }

    info!("Handler: Upload stored {} files", uploaded.len());
    Ok(HttpResponse::Created().json(uploaded))
}

#[get("/file/{id}")]
async fn download_file(
    identity: Option<Identity>,
    service: Data<FileService>,
    id: Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let opened = service.open(identity.as_ref(), id.into_inner()).await?;

    let disposition = attachment(&opened.record.original_name);

    let mut response = HttpResponse::Ok();
    response
        .content_type(opened.content_type().to_string())
        .insert_header(disposition);
    if let Some(length) = opened.blob.content_length {
        response.no_chunking(length);
    }
    Ok(response.streaming(opened.blob.body))
}

pub fn file_config(config: &mut ServiceConfig) {
    config.service(upload_files).service(download_file);
}
