//! The built-in error registry.
//!
//! # Taxonomy
//!
//! Entries are partitioned by convention into client, server, auth,
//! validation, storage, file, external-service, rate-limit, and application
//! groups. The partition is documentation; classification never branches on it.
//!
//! Each row reads `KEY => KindName = (status, "default message")`. The key
//! doubles as the stable code sent to clients in `errorCode`.
//!
//! # Governance
//!
//! - Stable codes and keys are unique. This is a const assertion at the bottom
//!   of the table: a duplicate row fails the build.
//! - A published stable code is never renamed or reused. Retire a kind by
//!   leaving its row in place.
//! - New kinds are new rows. The resolver and the classifier pick them up
//!   without changes.

use crate::codes::all_unique;

crate::define_error_definitions! {
    // -------------------------------------------------------------------------
    // Client-side (4xx)
    // -------------------------------------------------------------------------
    crate::ErrorGroup::Client => {
        BAD_REQUEST          => BadRequestError          = (400, "Bad request"),
        UNAUTHORIZED         => UnauthorizedError        = (401, "Unauthorized access"),
        FORBIDDEN            => ForbiddenError           = (403, "Forbidden"),
        NOT_FOUND            => NotFoundError            = (404, "Not found"),
        METHOD_NOT_ALLOWED   => MethodNotAllowedError    = (405, "Method not allowed"),
        NOT_ACCEPTABLE       => NotAcceptableError       = (406, "Not acceptable"),
        CONFLICT             => ConflictError            = (409, "Conflict error"),
        GONE                 => GoneError                = (410, "Resource gone"),
        PRECONDITION_FAILED  => PreconditionFailedError  = (412, "Precondition failed"),
        UNPROCESSABLE_ENTITY => UnprocessableEntityError = (422, "Unprocessable entity"),
        TOO_MANY_REQUESTS    => TooManyRequestsError     = (429, "Too many requests"),
    },

    // -------------------------------------------------------------------------
    // Server-side (5xx)
    // -------------------------------------------------------------------------
    crate::ErrorGroup::Server => {
        INTERNAL_SERVER_ERROR      => InternalServerErrorError      = (500, "Internal server error"),
        NOT_IMPLEMENTED            => NotImplementedError           = (501, "Not implemented"),
        BAD_GATEWAY                => BadGatewayError               = (502, "Bad gateway"),
        SERVICE_UNAVAILABLE        => ServiceUnavailableError       = (503, "Service unavailable"),
        GATEWAY_TIMEOUT            => GatewayTimeoutError           = (504, "Gateway timeout"),
        HTTP_VERSION_NOT_SUPPORTED => HttpVersionNotSupportedError  = (505, "HTTP version not supported"),
    },

    // -------------------------------------------------------------------------
    // Authentication & authorization
    // -------------------------------------------------------------------------
    // 440 is the conventional "login time-out" status; there is no registered
    // code for an expired session.
    crate::ErrorGroup::Auth => {
        AUTHENTICATION  => AuthenticationError = (401, "Authentication failed"),
        AUTHORIZATION   => AuthorizationError  = (403, "Authorization denied"),
        TOKEN_EXPIRED   => TokenExpiredError   = (401, "Token expired"),
        TOKEN_INVALID   => TokenInvalidError   = (401, "Token invalid"),
        SESSION_TIMEOUT => SessionTimeoutError = (440, "Session timeout"),
    },

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------
    crate::ErrorGroup::Validation => {
        VALIDATION_ERROR => ValidationErrorError = (400, "Validation failed"),
        FIELD_REQUIRED   => FieldRequiredError   = (400, "Required field missing"),
        FIELD_LENGTH     => FieldLengthError     = (400, "Invalid field length"),
        FIELD_FORMAT     => FieldFormatError     = (400, "Invalid field format"),
    },

    // -------------------------------------------------------------------------
    // Storage
    // -------------------------------------------------------------------------
    crate::ErrorGroup::Storage => {
        DATABASE_CONNECTION => DatabaseConnectionError = (500, "Database connection failed"),
        RECORD_NOT_FOUND    => RecordNotFoundError     = (404, "Database record not found"),
        DUPLICATE_KEY       => DuplicateKeyError       = (409, "Duplicate key error"),
        QUERY_TIMEOUT       => QueryTimeoutError       = (504, "Database query timeout"),
        DATABASE_VALIDATION => DatabaseValidationError = (400, "Database validation failed"),
    },

    // -------------------------------------------------------------------------
    // Files
    // -------------------------------------------------------------------------
    crate::ErrorGroup::File => {
        FILE_UPLOAD     => FileUploadError     = (400, "File upload failed"),
        FILE_NOT_FOUND  => FileNotFoundError   = (404, "File not found"),
        FILE_PERMISSION => FilePermissionError = (403, "File permission denied"),
        FILE_TOO_LARGE  => FileTooLargeError   = (413, "File too large"),
    },

    // -------------------------------------------------------------------------
    // External services
    // -------------------------------------------------------------------------
    crate::ErrorGroup::ExternalService => {
        EXTERNAL_SERVICE => ExternalServiceError = (502, "External service error"),
        SERVICE_TIMEOUT  => ServiceTimeoutError  = (504, "Service timeout"),
    },

    // -------------------------------------------------------------------------
    // Rate limiting
    // -------------------------------------------------------------------------
    crate::ErrorGroup::RateLimit => {
        RATE_LIMIT_EXCEEDED => RateLimitExceededError = (429, "Rate limit exceeded"),
    },

    // -------------------------------------------------------------------------
    // Application-specific
    // -------------------------------------------------------------------------
    crate::ErrorGroup::Application => {
        FEATURE_NOT_ENABLED => FeatureNotEnabledError = (403, "Feature not enabled"),
        INVALID_STATE       => InvalidStateError      = (400, "Invalid application state"),
        OPERATION_FAILED    => OperationFailedError   = (500, "Operation failed"),
        INVALID_INPUT       => InvalidInputError      = (400, "Invalid input"),
        UNKNOWN             => UnknownError           = (500, "An unknown error occurred"),
    },
}

const _: () = assert!(all_unique(ALL), "Duplicate stable code or key in the registry");
