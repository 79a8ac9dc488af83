use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use chapa_tools::GatewayApiError;
use mesob_engine::traits::{
    AuthApiError,
    CustomerApiError,
    DeliveryApiError,
    MenuApiError,
    OrderApiError,
    RestaurantApiError,
    StaffApiError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error")]
    CouldNotDeserializePayload,
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("A precondition for this request has not been met. {0}")]
    PreconditionFailed(String),
    #[error("The request conflicts with the current state. {0}")]
    Conflict(String),
    #[error("The request is well-formed but cannot be carried out. {0}")]
    UnprocessableEntity(String),
    #[error("The payment gateway could not be reached or gave an invalid response. {0}")]
    PaymentGatewayError(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PaymentGatewayError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("An access token is required for this endpoint, but none was provided.")]
    MissingToken,
    #[error("Access token is invalid. {0}")]
    InvalidToken(String),
    #[error("Invalid email or password.")]
    InvalidCredentials,
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
}

impl From<OrderApiError> for ServerError {
    fn from(e: OrderApiError) -> Self {
        match &e {
            OrderApiError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderApiError::MenuItemNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderApiError::MenuItemUnavailable(_) => Self::InvalidRequestBody(e.to_string()),
            OrderApiError::ValidationError(_) => Self::InvalidRequestBody(e.to_string()),
            OrderApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<DeliveryApiError> for ServerError {
    fn from(e: DeliveryApiError) -> Self {
        match &e {
            DeliveryApiError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            DeliveryApiError::DeliveryNotFound(_) => Self::NoRecordFound(e.to_string()),
            DeliveryApiError::PersonNotFound(_) => Self::NoRecordFound(e.to_string()),
            DeliveryApiError::OrderNotReady(_) => Self::PreconditionFailed(e.to_string()),
            DeliveryApiError::NotDelivered(_) => Self::PreconditionFailed(e.to_string()),
            DeliveryApiError::CampusMismatch { .. } => Self::UnprocessableEntity(e.to_string()),
            DeliveryApiError::AlreadyAssigned(_) => Self::Conflict(e.to_string()),
            DeliveryApiError::EmailTaken(_) => Self::Conflict(e.to_string()),
            DeliveryApiError::QueryError(_) => Self::InvalidRequestBody(e.to_string()),
            DeliveryApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<MenuApiError> for ServerError {
    fn from(e: MenuApiError) -> Self {
        match &e {
            MenuApiError::MenuItemNotFound(_) => Self::NoRecordFound(e.to_string()),
            MenuApiError::ValidationError(_) => Self::InvalidRequestBody(e.to_string()),
            MenuApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<CustomerApiError> for ServerError {
    fn from(e: CustomerApiError) -> Self {
        match &e {
            CustomerApiError::CustomerNotFound(_) => Self::NoRecordFound(e.to_string()),
            CustomerApiError::MenuItemNotFound(_) => Self::NoRecordFound(e.to_string()),
            CustomerApiError::EmailTaken(_) => Self::Conflict(e.to_string()),
            CustomerApiError::ValidationError(_) => Self::InvalidRequestBody(e.to_string()),
            CustomerApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<StaffApiError> for ServerError {
    fn from(e: StaffApiError) -> Self {
        match &e {
            StaffApiError::EmailTaken(_) => Self::Conflict(e.to_string()),
            StaffApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<RestaurantApiError> for ServerError {
    fn from(e: RestaurantApiError) -> Self {
        match &e {
            RestaurantApiError::ProfileNotSetUp => Self::NoRecordFound(e.to_string()),
            RestaurantApiError::ProfileAlreadyExists => Self::Conflict(e.to_string()),
            RestaurantApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<AuthApiError> for ServerError {
    fn from(e: AuthApiError) -> Self {
        match e {
            AuthApiError::DatabaseError(e) => Self::BackendError(format!("Database error: {e}")),
        }
    }
}

impl From<GatewayApiError> for ServerError {
    fn from(e: GatewayApiError) -> Self {
        Self::PaymentGatewayError(e.to_string())
    }
}
