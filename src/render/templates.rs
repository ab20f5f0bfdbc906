//! Template sources
//!
//! Liquid templates for the generated C++ header and C# build rules. Both
//! include the `copyright` partial as their first line.

/// Notice used when the config gives no copyright text
pub const DEFAULT_COPYRIGHT: &str =
    "Fill out your copyright notice in the Description page of Project Settings.";

pub const COPYRIGHT: &str = "// {{ copyright }}";

pub const HEADER: &str = r#"{% include 'copyright' %}

#pragma once

#include "CoreMinimal.h"
#include "Modules/ModuleInterface.h"

class I{{ module_name }}Module : public IModuleInterface
{
public:
	virtual void StartupModule() override;
	virtual void ShutdownModule() override;
};

class F{{ module_name }}Module : public I{{ module_name }}Module
{
public:
	virtual void StartupModule() override;
	virtual void ShutdownModule() override;
	virtual bool IsGameModule() const override { return {% if is_game_module %}true{% else %}false{% endif %}; }
};
"#;

pub const BUILD_FILE: &str = r#"{% include 'copyright' %}

using UnrealBuildTool;

public class {{ module_name }} : ModuleRules
{
	public {{ module_name }}(ReadOnlyTargetRules Target) : base(Target)
	{
		PCHUsage = PCHUsageMode.UseExplicitOrSharedPCHs;
{%- if has_public_dependencies %}

		PublicDependencyModuleNames.AddRange(new string[]
		{
{%- for dep in public_dependencies %}
			"{{ dep }}",
{%- endfor %}
		});
{%- endif %}
{%- if has_private_dependencies %}

		PrivateDependencyModuleNames.AddRange(new string[]
		{
{%- for dep in private_dependencies %}
			"{{ dep }}",
{%- endfor %}
		});
{%- endif %}
	}
}
"#;
