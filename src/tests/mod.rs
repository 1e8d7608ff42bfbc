mod shell_scenarios;
