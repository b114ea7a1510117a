//! IAM policy documents for the managed flow execution role

use serde_json::{json, Value};

/// Lets the Bedrock service assume the role
pub fn trust_policy() -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": {"Service": "bedrock.amazonaws.com"},
            "Action": "sts:AssumeRole"
        }]
    })
}

/// Inline permissions for flow management and the resources flows call
pub fn flow_execution_policy() -> Value {
    json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Sid": "BedrockFlowPermissions",
                "Effect": "Allow",
                "Action": [
                    "bedrock:CreateFlow",
                    "bedrock:UpdateFlow",
                    "bedrock:GetFlow",
                    "bedrock:ListFlows",
                    "bedrock:DeleteFlow",
                    "bedrock:ValidateFlowDefinition",
                    "bedrock:CreateFlowVersion",
                    "bedrock:GetFlowVersion",
                    "bedrock:ListFlowVersions",
                    "bedrock:DeleteFlowVersion",
                    "bedrock:CreateFlowAlias",
                    "bedrock:UpdateFlowAlias",
                    "bedrock:GetFlowAlias",
                    "bedrock:ListFlowAliases",
                    "bedrock:DeleteFlowAlias",
                    "bedrock:InvokeFlow",
                    "bedrock:TagResource",
                    "bedrock:UntagResource",
                    "bedrock:ListTagsForResource"
                ],
                "Resource": "*"
            },
            {
                "Sid": "BedrockResourcePermissions",
                "Effect": "Allow",
                "Action": [
                    "bedrock:ApplyGuardrail",
                    "bedrock:InvokeGuardrail",
                    "bedrock:InvokeModel",
                    "bedrock:GetCustomModel",
                    "bedrock:InvokeAgent",
                    "bedrock:Retrieve",
                    "bedrock:RetrieveAndGenerate",
                    "bedrock:GetPrompt",
                    "bedrock:ListPrompts",
                    "bedrock:RenderPrompt"
                ],
                "Resource": "*"
            },
            {
                "Sid": "GetBedrockResources",
                "Effect": "Allow",
                "Action": [
                    "bedrock:GetAgent",
                    "bedrock:GetKnowledgeBase",
                    "bedrock:GetGuardrail",
                    "bedrock:GetPrompt"
                ],
                "Resource": "*"
            }
        ]
    })
}
