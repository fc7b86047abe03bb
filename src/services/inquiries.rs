use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::ApiError,
    models::{
        CreateInquiryRequest, Inquiry, InquiryDetails, InquiryStatus, NewInquiry,
        PropertyImage, PropertySummary, UserContact,
    },
    repository::RepositoryState,
};

/// InquiryService
///
/// Contact requests from tenants to owners, and the owner-side status workflow.
#[derive(Clone)]
pub struct InquiryService {
    repo: RepositoryState,
}

impl InquiryService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// Property summaries (with their first image) keyed by property id.
    async fn summaries(
        &self,
        property_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, PropertySummary>, ApiError> {
        let mut first_images: HashMap<Uuid, PropertyImage> = HashMap::new();
        for image in self.repo.images_for_properties(property_ids).await? {
            match first_images.get(&image.property_id) {
                Some(current) if current.order <= image.order => {}
                _ => {
                    first_images.insert(image.property_id, image);
                }
            }
        }

        Ok(self
            .repo
            .properties_by_ids(property_ids)
            .await?
            .iter()
            .map(|p| (p.id, PropertySummary::new(p, first_images.remove(&p.id))))
            .collect())
    }

    async fn senders(&self, inquiries: &[Inquiry]) -> Result<HashMap<Uuid, UserContact>, ApiError> {
        let mut ids: Vec<Uuid> = inquiries.iter().map(|i| i.user_id).collect();
        ids.sort();
        ids.dedup();
        Ok(self
            .repo
            .user_contacts(&ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect())
    }

    /// Records a new inquiry with status NEW. Contact fields the sender left out
    /// are copied from the sender's profile.
    pub async fn create(
        &self,
        sender: &AuthUser,
        req: CreateInquiryRequest,
    ) -> Result<InquiryDetails, ApiError> {
        let property = self
            .repo
            .get_property(req.property_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Property"))?;

        let profile = self
            .repo
            .find_user_by_id(sender.id)
            .await?
            .ok_or_else(|| ApiError::not_found("User"))?;

        let inquiry = self
            .repo
            .create_inquiry(NewInquiry {
                property_id: property.id,
                user_id: sender.id,
                contact_type: req.contact_type,
                message: req.message,
                user_phone: req.user_phone.or_else(|| profile.phone.clone()),
                user_email: req.user_email.or_else(|| Some(profile.email.clone())),
                user_name: req.user_name.or_else(|| Some(profile.name.clone())),
            })
            .await?;
        tracing::info!(inquiry_id = %inquiry.id, property_id = %property.id, sender_id = %sender.id, "inquiry created");

        let mut summaries = self.summaries(&[property.id]).await?;
        Ok(InquiryDetails {
            property: summaries.remove(&property.id),
            sender: Some(UserContact::from(&profile)),
            inquiry,
        })
    }

    /// Inquiries received for one property, newest first. A missing property
    /// and a property the caller does not own give the same 404.
    pub async fn list_for_property(
        &self,
        property_id: Uuid,
        requester: &AuthUser,
    ) -> Result<Vec<InquiryDetails>, ApiError> {
        let owned = self
            .repo
            .get_property(property_id)
            .await?
            .filter(|p| requester.may_modify(p.owner_id));
        if owned.is_none() {
            return Err(ApiError::NotFound(
                "Property not found or access denied".to_string(),
            ));
        }

        let inquiries = self.repo.list_inquiries_for_property(property_id).await?;
        let senders = self.senders(&inquiries).await?;

        Ok(inquiries
            .into_iter()
            .map(|inquiry| InquiryDetails {
                sender: senders.get(&inquiry.user_id).cloned(),
                property: None,
                inquiry,
            })
            .collect())
    }

    /// Inquiries the caller has sent, newest first, each with a property summary.
    pub async fn list_mine(&self, user_id: Uuid) -> Result<Vec<InquiryDetails>, ApiError> {
        let inquiries = self.repo.list_inquiries_by_user(user_id).await?;

        let mut property_ids: Vec<Uuid> = inquiries.iter().map(|i| i.property_id).collect();
        property_ids.sort();
        property_ids.dedup();
        let summaries = self.summaries(&property_ids).await?;

        Ok(inquiries
            .into_iter()
            .map(|inquiry| InquiryDetails {
                property: summaries.get(&inquiry.property_id).cloned(),
                sender: None,
                inquiry,
            })
            .collect())
    }

    /// Moves an inquiry along its lifecycle. Only the property's owner may do
    /// this; setting the current status again changes nothing.
    pub async fn update_status(
        &self,
        id: Uuid,
        requester: &AuthUser,
        status: InquiryStatus,
    ) -> Result<Inquiry, ApiError> {
        let inquiry = self
            .repo
            .get_inquiry(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Inquiry"))?;

        let property = self
            .repo
            .get_property(inquiry.property_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Inquiry"))?;

        if !requester.may_modify(property.owner_id) {
            tracing::warn!(inquiry_id = %id, caller_id = %requester.id, "inquiry status change denied");
            return Err(ApiError::Forbidden("Access denied".to_string()));
        }

        if !inquiry.status.can_transition_to(status) {
            return Err(ApiError::BadRequest(format!(
                "Cannot change inquiry status from {} to {}",
                inquiry.status.as_str(),
                status.as_str()
            )));
        }
        if inquiry.status == status {
            return Ok(inquiry);
        }

        let updated = self
            .repo
            .update_inquiry_status(id, status)
            .await?
            .ok_or_else(|| ApiError::not_found("Inquiry"))?;
        tracing::info!(inquiry_id = %id, status = ?status, "inquiry status updated");
        Ok(updated)
    }
}
