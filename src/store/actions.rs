//! Workflow actions that change system-owned fields.
//!
//! Forms never touch these fields (notification send state, view and download
//! counters, upload review), so each transition has its own operation here.

use std::sync::Arc;

use chrono::Utc;

use super::{Entity, FormMode, Portal, Validator};
use crate::delivery::DeliveryChannel;
use crate::errors::AppError;
use crate::models::{
    CurrentUser, EntityKind, Notification, NotificationStatus, UploadStatus, UploadedFile,
    UploadedFileForm,
};
use crate::storage::{self, FileStorage};
use crate::visibility;

impl Portal {
    /// Deliver a notification through every channel and mark it sent.
    pub fn send_notification(
        &mut self,
        user: &CurrentUser,
        id: &str,
        channels: &[Arc<dyn DeliveryChannel>],
    ) -> Result<Notification, AppError> {
        if !user.role.permissions().can_send_notifications {
            return Err(AppError::forbidden(EntityKind::Notification, "send"));
        }

        let viewer = self.viewer(user);
        let notification = self
            .notifications
            .get(id)
            .filter(|n| visibility::is_visible(*n, &viewer))
            .ok_or_else(|| AppError::not_found(EntityKind::Notification, id))?;
        if !visibility::is_editable(notification, &viewer) {
            return Err(AppError::forbidden(EntityKind::Notification, "send"));
        }
        if notification.is_sent() {
            return Err(AppError::field("status", "notification was already sent"));
        }

        for channel in channels {
            tracing::debug!(id, channel = channel.name(), "delivering notification");
            channel.deliver(notification)?;
        }

        let now = Utc::now();
        let sent = self
            .notifications
            .modify(id, |n| {
                n.status = NotificationStatus::Sent;
                n.sent_at = Some(now);
                n.updated_at = now;
            })
            .ok_or_else(|| AppError::not_found(EntityKind::Notification, id))?;
        self.commit();

        tracing::info!(id, user = %user.id, channels = channels.len(), "notification sent");
        Ok(sent)
    }

    /// Count one view of a notification by a user who can see it.
    pub fn record_notification_view(
        &mut self,
        user: &CurrentUser,
        id: &str,
    ) -> Result<Notification, AppError> {
        if self.find_visible::<Notification>(user, id).is_none() {
            return Err(AppError::not_found(EntityKind::Notification, id));
        }
        let viewed = self
            .notifications
            .modify(id, |n| n.view_count += 1)
            .ok_or_else(|| AppError::not_found(EntityKind::Notification, id))?;
        self.commit();
        Ok(viewed)
    }

    /// Store `content` and register it as a pending upload owned by `user`.
    ///
    /// The form is validated before any bytes are written, and the stored
    /// object is dropped again if the record cannot be created.
    pub fn add_upload(
        &mut self,
        user: &CurrentUser,
        storage: &dyn FileStorage,
        file_name: &str,
        content_type: &str,
        content: &[u8],
        category: Option<String>,
    ) -> Result<UploadedFile, AppError> {
        if !user.role.can_upload() {
            return Err(AppError::forbidden(EntityKind::Upload, "upload"));
        }

        let file_name = storage::base_name(file_name);
        let mut form = UploadedFileForm {
            file_name: Some(file_name.to_string()),
            category: category.filter(|c| !c.trim().is_empty()),
            uploaded_by: None,
        };
        let mut v = Validator::new(FormMode::Create);
        UploadedFile::validate(&form, &mut v);
        v.finish()?;
        UploadedFile::assign_owner(&mut form, user);

        let object = storage.store(file_name, content_type, content)?;
        let created = self.uploads.create(form, Utc::now());
        let upload = self.uploads.modify(&created.id, |f| {
            f.url = object.url.clone();
            f.size = object.size;
            f.content_type = object.content_type.clone();
        });
        let Some(upload) = upload else {
            discard(storage, &object.url);
            return Err(AppError::Internal("upload vanished after create".to_string()));
        };
        self.commit();

        tracing::info!(id = %upload.id, user = %user.id, size = upload.size, "file uploaded");
        Ok(upload)
    }

    /// Delete an upload record and free its stored contents.
    pub fn delete_upload(
        &mut self,
        user: &CurrentUser,
        id: &str,
        storage: &dyn FileStorage,
    ) -> Result<bool, AppError> {
        let url = self.uploads.get(id).map(|f| f.url.clone());
        let deleted = self.delete::<UploadedFile>(user, id)?;
        if let Some(url) = url.filter(|_| deleted) {
            discard(storage, &url);
        }
        Ok(deleted)
    }

    /// Approve or reject a pending upload. Administrators only.
    pub fn review_upload(
        &mut self,
        user: &CurrentUser,
        id: &str,
        approve: bool,
    ) -> Result<UploadedFile, AppError> {
        if !user.role.is_admin() {
            return Err(AppError::forbidden(EntityKind::Upload, "review"));
        }
        let upload = self
            .uploads
            .get(id)
            .ok_or_else(|| AppError::not_found(EntityKind::Upload, id))?;
        if upload.status != UploadStatus::Pending {
            return Err(AppError::field(
                "status",
                format!("upload is already {}", upload.status.as_str().to_lowercase()),
            ));
        }

        let now = Utc::now();
        let status = if approve {
            UploadStatus::Approved
        } else {
            UploadStatus::Rejected
        };
        let reviewed = self
            .uploads
            .modify(id, |f| {
                f.status = status;
                f.reviewed_by = Some(user.id.clone());
                f.reviewed_at = Some(now);
                f.updated_at = now;
            })
            .ok_or_else(|| AppError::not_found(EntityKind::Upload, id))?;
        self.commit();

        tracing::info!(id, user = %user.id, status = status.as_str(), "upload reviewed");
        Ok(reviewed)
    }

    /// Count a download of a visible upload and return its record.
    pub fn record_download(
        &mut self,
        user: &CurrentUser,
        id: &str,
    ) -> Result<UploadedFile, AppError> {
        if self.find_visible::<UploadedFile>(user, id).is_none() {
            return Err(AppError::not_found(EntityKind::Upload, id));
        }
        let upload = self
            .uploads
            .modify(id, |f| f.download_count += 1)
            .ok_or_else(|| AppError::not_found(EntityKind::Upload, id))?;
        self.commit();
        Ok(upload)
    }
}

/// Best-effort removal of stored bytes that no record points at.
fn discard(storage: &dyn FileStorage, url: &str) {
    if let Err(e) = storage.remove(url) {
        tracing::warn!(%url, error = %e, "failed to remove stored upload");
    }
}
