use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::{discard_stored, load_owned_video, parse_video_id, read_image_field};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tubely_core::VideoResponse;
use tubely_storage::keys::{asset_key, random_token};

const THUMBNAIL_FIELD: &str = "thumbnail";

#[tracing::instrument(skip(state, auth, multipart), fields(user_id = %auth.user_id))]
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(video_id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let mut video = load_owned_video(state.videos.as_ref(), video_id, auth.user_id).await?;

    let image = read_image_field(
        multipart,
        THUMBNAIL_FIELD,
        state.config.max_thumbnail_size_bytes(),
    )
    .await?;

    let storage_key = asset_key(&random_token(), image.extension());
    let size = image.data.len();
    let url = state
        .assets
        .upload_with_key(&storage_key, image.data, &image.media_type)
        .await?;

    video.thumbnail_url = Some(url);
    let video = match state.videos.update_video(&video).await {
        Ok(video) => video,
        Err(e) => {
            discard_stored(state.assets.as_ref(), &storage_key).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        video_id = %video.id,
        storage_key = %storage_key,
        size_bytes = size,
        "Thumbnail uploaded"
    );

    Ok((StatusCode::OK, Json(VideoResponse::from(video))))
}
