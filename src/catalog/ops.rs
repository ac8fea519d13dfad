use super::{Impact, OperationDescriptor, Paging, ParamSpec, ParamType};

const fn req(name: &'static str, field: &'static str, ty: ParamType, description: &'static str) -> ParamSpec {
    ParamSpec { name, field, ty, required: true, description }
}

const fn opt(name: &'static str, field: &'static str, ty: ParamType, description: &'static str) -> ParamSpec {
    ParamSpec { name, field, ty, required: false, description }
}

const SORT_ORDER: ParamType = ParamType::Enum(&["ASC", "DESC"]);
const SORT_BY: ParamType = ParamType::Enum(&["TIMECREATED", "DISPLAYNAME"]);

const PAGE: ParamSpec = opt("Page", "page", ParamType::String, "Continuation token from a previous list call");
const LIMIT: ParamSpec = opt("Limit", "limit", ParamType::Integer, "Maximum number of items per page");
const IF_MATCH: ParamSpec = opt("IfMatch", "ifMatch", ParamType::String, "Optimistic concurrency etag");
const RETRY_TOKEN: ParamSpec =
    opt("OpcRetryToken", "opcRetryToken", ParamType::String, "Idempotency token for retried requests");

const OPC_PAGING: Option<Paging> = Some(Paging { token_param: "Page", token_field: "opcNextPage" });

const LIST_FIELDS: &[&str] = &["items", "opcNextPage", "opcRequestId"];
const WORK_REQUEST_FIELDS: &[&str] = &["opcRequestId", "opcWorkRequestId"];

pub(super) const OPERATIONS: &[OperationDescriptor] = &[
    /* ---- core: compute ---- */
    OperationDescriptor {
        service: "core",
        name: "ListInstances",
        summary: "List compute instances in a compartment",
        params: &[
            req("CompartmentId", "compartmentId", ParamType::String, "Compartment OCID"),
            opt("AvailabilityDomain", "availabilityDomain", ParamType::String, "Availability domain name"),
            opt("DisplayName", "displayName", ParamType::String, "Exact display name filter"),
            opt(
                "LifecycleState",
                "lifecycleState",
                ParamType::Enum(&["PROVISIONING", "RUNNING", "STOPPING", "STOPPED", "TERMINATED"]),
                "Lifecycle state filter",
            ),
            opt("SortBy", "sortBy", SORT_BY, "Sort field"),
            opt("SortOrder", "sortOrder", SORT_ORDER, "Sort direction"),
            LIMIT,
            PAGE,
        ],
        body_field: "items",
        response_fields: LIST_FIELDS,
        default_field: "items",
        impact: Impact::None,
        paging: OPC_PAGING,
    },
    OperationDescriptor {
        service: "core",
        name: "GetInstance",
        summary: "Get a single compute instance",
        params: &[req("InstanceId", "instanceId", ParamType::String, "Instance OCID")],
        body_field: "instance",
        response_fields: &["instance", "etag", "opcRequestId"],
        default_field: "instance",
        impact: Impact::None,
        paging: None,
    },
    OperationDescriptor {
        service: "core",
        name: "LaunchInstance",
        summary: "Launch a new compute instance",
        params: &[
            req("CompartmentId", "launchInstanceDetails.compartmentId", ParamType::String, "Compartment OCID"),
            req(
                "AvailabilityDomain",
                "launchInstanceDetails.availabilityDomain",
                ParamType::String,
                "Availability domain name",
            ),
            req("Shape", "launchInstanceDetails.shape", ParamType::String, "Instance shape"),
            opt("DisplayName", "launchInstanceDetails.displayName", ParamType::String, "Display name"),
            opt("SubnetId", "launchInstanceDetails.createVnicDetails.subnetId", ParamType::String, "Subnet OCID"),
            opt(
                "AssignPublicIp",
                "launchInstanceDetails.createVnicDetails.assignPublicIp",
                ParamType::Boolean,
                "Attach a public IP to the primary VNIC",
            ),
            RETRY_TOKEN,
        ],
        body_field: "instance",
        response_fields: &["instance", "etag", "opcRequestId", "opcWorkRequestId"],
        default_field: "instance",
        impact: Impact::Low,
        paging: None,
    },
    OperationDescriptor {
        service: "core",
        name: "TerminateInstance",
        summary: "Terminate a compute instance",
        params: &[
            req("InstanceId", "instanceId", ParamType::String, "Instance OCID"),
            opt(
                "PreserveBootVolume",
                "preserveBootVolume",
                ParamType::Boolean,
                "Keep the boot volume after termination",
            ),
            IF_MATCH,
        ],
        body_field: "opcWorkRequestId",
        response_fields: WORK_REQUEST_FIELDS,
        default_field: "opcWorkRequestId",
        impact: Impact::High,
        paging: None,
    },
    /* ---- core: networking ---- */
    OperationDescriptor {
        service: "core",
        name: "ListVcns",
        summary: "List virtual cloud networks in a compartment",
        params: &[
            req("CompartmentId", "compartmentId", ParamType::String, "Compartment OCID"),
            opt("DisplayName", "displayName", ParamType::String, "Exact display name filter"),
            opt(
                "LifecycleState",
                "lifecycleState",
                ParamType::Enum(&["PROVISIONING", "AVAILABLE", "TERMINATING", "TERMINATED", "UPDATING"]),
                "Lifecycle state filter",
            ),
            opt("SortBy", "sortBy", SORT_BY, "Sort field"),
            opt("SortOrder", "sortOrder", SORT_ORDER, "Sort direction"),
            LIMIT,
            PAGE,
        ],
        body_field: "items",
        response_fields: LIST_FIELDS,
        default_field: "items",
        impact: Impact::None,
        paging: OPC_PAGING,
    },
    OperationDescriptor {
        service: "core",
        name: "CreateVcn",
        summary: "Create a virtual cloud network",
        params: &[
            req("CompartmentId", "createVcnDetails.compartmentId", ParamType::String, "Compartment OCID"),
            req("CidrBlocks", "createVcnDetails.cidrBlocks", ParamType::StringList, "IPv4 CIDR blocks"),
            opt("DisplayName", "createVcnDetails.displayName", ParamType::String, "Display name"),
            opt("DnsLabel", "createVcnDetails.dnsLabel", ParamType::String, "DNS label"),
            opt("IsIpv6Enabled", "createVcnDetails.isIpv6Enabled", ParamType::Boolean, "Assign an IPv6 prefix"),
            RETRY_TOKEN,
        ],
        body_field: "vcn",
        response_fields: &["vcn", "etag", "opcRequestId"],
        default_field: "vcn",
        impact: Impact::Low,
        paging: None,
    },
    OperationDescriptor {
        service: "core",
        name: "UpdateVcn",
        summary: "Update a virtual cloud network",
        params: &[
            req("VcnId", "vcnId", ParamType::String, "VCN OCID"),
            opt("DisplayName", "updateVcnDetails.displayName", ParamType::String, "Display name"),
            IF_MATCH,
        ],
        body_field: "vcn",
        response_fields: &["vcn", "etag", "opcRequestId"],
        default_field: "vcn",
        impact: Impact::Medium,
        paging: None,
    },
    OperationDescriptor {
        service: "core",
        name: "DeleteVcn",
        summary: "Delete a virtual cloud network",
        params: &[req("VcnId", "vcnId", ParamType::String, "VCN OCID"), IF_MATCH],
        body_field: "opcRequestId",
        response_fields: &["opcRequestId"],
        default_field: "opcRequestId",
        impact: Impact::High,
        paging: None,
    },
    OperationDescriptor {
        service: "core",
        name: "RejectDrgAttachment",
        summary: "Reject a pending cross-tenancy DRG attachment",
        params: &[
            req("DrgAttachmentId", "drgAttachmentId", ParamType::String, "DRG attachment OCID"),
            IF_MATCH,
            RETRY_TOKEN,
        ],
        body_field: "drgAttachment",
        response_fields: &["drgAttachment", "etag", "opcRequestId"],
        default_field: "drgAttachment",
        impact: Impact::High,
        paging: None,
    },
    /* ---- database ---- */
    OperationDescriptor {
        service: "database",
        name: "DisableAutonomousDatabaseOperationsInsights",
        summary: "Disable Operations Insights for an autonomous database",
        params: &[
            req("AutonomousDatabaseId", "autonomousDatabaseId", ParamType::String, "Autonomous database OCID"),
            IF_MATCH,
        ],
        body_field: "opcWorkRequestId",
        response_fields: WORK_REQUEST_FIELDS,
        default_field: "opcWorkRequestId",
        impact: Impact::High,
        paging: None,
    },
    OperationDescriptor {
        service: "database",
        name: "ListAutonomousDatabases",
        summary: "List autonomous databases in a compartment",
        params: &[
            req("CompartmentId", "compartmentId", ParamType::String, "Compartment OCID"),
            opt(
                "DbWorkload",
                "dbWorkload",
                ParamType::Enum(&["OLTP", "DW", "AJD", "APEX"]),
                "Workload type filter",
            ),
            opt("IsFreeTier", "isFreeTier", ParamType::Boolean, "Only free tier databases"),
            opt("SortOrder", "sortOrder", SORT_ORDER, "Sort direction"),
            LIMIT,
            PAGE,
        ],
        body_field: "items",
        response_fields: LIST_FIELDS,
        default_field: "items",
        impact: Impact::None,
        paging: OPC_PAGING,
    },
    /* ---- identity ---- */
    OperationDescriptor {
        service: "identity",
        name: "ListUsers",
        summary: "List users in a tenancy",
        params: &[
            req("CompartmentId", "compartmentId", ParamType::String, "Tenancy OCID"),
            opt("Name", "name", ParamType::String, "Exact user name filter"),
            LIMIT,
            PAGE,
        ],
        body_field: "items",
        response_fields: LIST_FIELDS,
        default_field: "items",
        impact: Impact::None,
        paging: OPC_PAGING,
    },
    OperationDescriptor {
        service: "identity",
        name: "UpdateUserCapabilities",
        summary: "Enable or disable credential types for a user",
        params: &[
            req("UserId", "userId", ParamType::String, "User OCID"),
            opt(
                "CanUseApiKeys",
                "updateUserCapabilitiesDetails.canUseApiKeys",
                ParamType::Boolean,
                "Allow API signing keys",
            ),
            opt(
                "CanUseConsolePassword",
                "updateUserCapabilitiesDetails.canUseConsolePassword",
                ParamType::Boolean,
                "Allow console password login",
            ),
            IF_MATCH,
        ],
        body_field: "user",
        response_fields: &["user", "etag", "opcRequestId"],
        default_field: "user",
        impact: Impact::Medium,
        paging: None,
    },
    /* ---- objectstorage ---- */
    OperationDescriptor {
        service: "objectstorage",
        name: "GetNamespace",
        summary: "Get the object storage namespace of the tenancy",
        params: &[opt("CompartmentId", "compartmentId", ParamType::String, "Compartment OCID")],
        body_field: "value",
        response_fields: &["value", "opcRequestId"],
        default_field: "value",
        impact: Impact::None,
        paging: None,
    },
    OperationDescriptor {
        service: "objectstorage",
        name: "ListBuckets",
        summary: "List buckets in a namespace and compartment",
        params: &[
            req("NamespaceName", "namespaceName", ParamType::String, "Object storage namespace"),
            req("CompartmentId", "compartmentId", ParamType::String, "Compartment OCID"),
            opt(
                "Fields",
                "fields",
                ParamType::Enum(&["tags"]),
                "Extra fields to include in each summary",
            ),
            LIMIT,
            PAGE,
        ],
        body_field: "items",
        response_fields: LIST_FIELDS,
        default_field: "items",
        impact: Impact::None,
        paging: OPC_PAGING,
    },
    OperationDescriptor {
        service: "objectstorage",
        name: "DeleteObjects",
        summary: "Delete several objects from a bucket",
        params: &[
            req("NamespaceName", "namespaceName", ParamType::String, "Object storage namespace"),
            req("BucketName", "bucketName", ParamType::String, "Bucket name"),
            req("ObjectNames", "deleteObjectsDetails.objectNames", ParamType::StringList, "Objects to delete"),
            opt("VersionIds", "deleteObjectsDetails.versionIds", ParamType::IntegerList, "Version ids, paired with ObjectNames"),
        ],
        body_field: "deleted",
        response_fields: &["deleted", "opcRequestId"],
        default_field: "deleted",
        impact: Impact::High,
        paging: None,
    },
];
